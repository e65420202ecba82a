//! Manual downgrade reconciliation.

use std::sync::Arc;

use clap::Args;
use uuid::Uuid;

use galleryhub_core::error::AppError;
use galleryhub_core::traits::SystemClock;
use galleryhub_core::types::OwnerId;
use galleryhub_entity::plan::{Limit, PermissionMatrix, PlanTier};
use galleryhub_service::{DowngradeEvent, DowngradeReconciler};

use crate::output::{self, OutputFormat};

/// Arguments for the reconcile command
#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// Owner ID
    #[arg(short, long)]
    pub owner: Uuid,
    /// Tier the owner moved from
    #[arg(long)]
    pub from: Option<PlanTier>,
    /// Tier the owner moved to
    #[arg(long)]
    pub to: PlanTier,
    /// Active-gallery limit to enforce, a number or `unlimited`
    /// (default: the gallery quota of `--to`)
    #[arg(long, value_parser = parse_limit)]
    pub limit: Option<Limit>,
}

fn parse_limit(s: &str) -> Result<Limit, String> {
    if s.eq_ignore_ascii_case("unlimited") {
        return Ok(Limit::Unlimited);
    }
    s.parse::<u32>()
        .map(Limit::Count)
        .map_err(|_| format!("expected a number or 'unlimited', got '{s}'"))
}

/// Execute the reconcile command
pub async fn execute(
    args: &ReconcileArgs,
    env: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let db = super::connect(&config).await?;

    let mut event = DowngradeEvent::for_tier(
        OwnerId::from_uuid(args.owner),
        args.from,
        args.to,
        PermissionMatrix::standard(),
    );
    if let Some(limit) = args.limit {
        event.new_limit = limit;
    }

    let reconciler = DowngradeReconciler::new(Arc::new(db.galleries()), Arc::new(SystemClock));
    let report = reconciler.reconcile(&event).await?;

    match format {
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Table => {
            output::print_kv("Owner", &report.owner_id.to_string());
            output::print_kv("New tier", report.new_tier.display_name());
            output::print_kv("Limit", &report.new_limit.to_string());
            output::print_kv("Active before", &report.active_before.to_string());
            output::print_kv("Archived", &report.archived_count.to_string());
            for id in &report.archived_ids {
                println!("    - {}", id);
            }
            output::print_success("Downgrade reconciled.");
        }
    }

    db.close().await;
    Ok(())
}
