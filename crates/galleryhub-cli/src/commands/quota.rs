//! Owner quota inspection.

use std::sync::Arc;

use clap::Args;
use uuid::Uuid;

use galleryhub_core::error::AppError;
use galleryhub_core::types::OwnerId;
use galleryhub_database::GalleryStore;
use galleryhub_entity::gallery::GalleryStatus;
use galleryhub_entity::plan::{PermissionMatrix, PlanTier};
use galleryhub_service::QuotaGuard;

use crate::output::{self, OutputFormat};

/// Arguments for the quota command
#[derive(Debug, Args)]
pub struct QuotaArgs {
    /// Owner ID
    #[arg(short, long)]
    pub owner: Uuid,
    /// Tier to evaluate against
    #[arg(short, long)]
    pub tier: PlanTier,
}

/// Execute the quota command
pub async fn execute(args: &QuotaArgs, env: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let db = super::connect(&config).await?;
    let owner = OwnerId::from_uuid(args.owner);

    let store: Arc<dyn GalleryStore> = Arc::new(db.galleries());
    let guard = QuotaGuard::new(
        Arc::clone(&store),
        Arc::new(PermissionMatrix::standard().clone()),
    );
    let snapshot = guard.can_create(owner, args.tier).await?;
    let archived = store.count_by_status(owner, GalleryStatus::Archived).await?;
    let trashed = store.count_by_status(owner, GalleryStatus::Trashed).await?;

    match format {
        OutputFormat::Json => output::print_json(&serde_json::json!({
            "owner_id": owner,
            "quota": snapshot,
            "archived": archived,
            "trashed": trashed,
        })),
        OutputFormat::Table => {
            println!("Quota for {}:", owner);
            output::print_kv("Tier", args.tier.display_name());
            output::print_kv("Limit", &snapshot.limit.to_string());
            output::print_kv(
                "Active",
                &snapshot.current_count.unwrap_or_default().to_string(),
            );
            output::print_kv("Archived", &archived.to_string());
            output::print_kv("Trashed", &trashed.to_string());
            output::print_kv("Can create", if snapshot.allowed { "yes" } else { "no" });
            if let Some(message) = &snapshot.message {
                output::print_warning(message);
            }
        }
    }

    db.close().await;
    Ok(())
}
