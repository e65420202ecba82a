//! Manual trash retention sweep.

use std::sync::Arc;

use chrono::Utc;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use galleryhub_core::config::lifecycle::MAX_RETENTION_DAYS;
use galleryhub_core::error::AppError;
use galleryhub_core::traits::SystemClock;
use galleryhub_database::GalleryStore;
use galleryhub_service::{RetentionPurger, retention_cutoff};

use crate::output::{self, OutputFormat};

/// Arguments for the sweep command
#[derive(Debug, Args)]
pub struct SweepArgs {
    /// Retention window in days (default: `lifecycle.retention_days`)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(..=i64::from(MAX_RETENTION_DAYS)))]
    pub days: Option<u32>,
    /// List what would be purged without deleting anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Gallery display row
#[derive(Debug, Serialize, Tabled)]
struct GalleryRow {
    id: String,
    owner_id: String,
    slug: String,
}

/// Execute the sweep command
pub async fn execute(args: &SweepArgs, env: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let db = super::connect(&config).await?;
    let days = args.days.unwrap_or(config.lifecycle.retention_days);

    let rows: Vec<GalleryRow> = if args.dry_run {
        let cutoff = retention_cutoff(Utc::now(), days)?;
        db.galleries()
            .find_trashed_before(cutoff)
            .await?
            .into_iter()
            .map(|g| GalleryRow {
                id: g.id.to_string(),
                owner_id: g.owner_id.to_string(),
                slug: g.slug,
            })
            .collect()
    } else {
        let purger = RetentionPurger::new(
            Arc::new(db.galleries()),
            Arc::new(db.audit_log()),
            Arc::new(SystemClock),
        );
        purger
            .sweep(days)
            .await?
            .into_iter()
            .map(|g| GalleryRow {
                id: g.id.to_string(),
                owner_id: g.owner_id.to_string(),
                slug: g.slug,
            })
            .collect()
    };

    output::print_list(&rows, format);
    if format == OutputFormat::Table {
        let verb = if args.dry_run { "would be purged" } else { "purged" };
        output::print_success(&format!(
            "{} galleries {} (retention {} days)",
            rows.len(),
            verb,
            days
        ));
    }

    db.close().await;
    Ok(())
}
