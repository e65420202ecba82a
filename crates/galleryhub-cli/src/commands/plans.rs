//! Plan entitlement matrix commands. These need no database.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use galleryhub_core::error::AppError;
use galleryhub_entity::plan::{FeatureKey, PermissionMatrix, PlanTier};

use crate::output::{self, OutputFormat};

/// Arguments for plan commands
#[derive(Debug, Args)]
pub struct PlansArgs {
    /// Plan subcommand
    #[command(subcommand)]
    pub command: PlansCommand,
}

/// Plan subcommands
#[derive(Debug, Subcommand)]
pub enum PlansCommand {
    /// Show the full matrix, or a single tier
    Show {
        /// Tier to show
        tier: Option<PlanTier>,
    },
    /// Show the dimensions that differ between two tiers
    Compare {
        /// Tier to compare from
        from: PlanTier,
        /// Tier to compare to
        to: PlanTier,
    },
    /// Suggest the tier that unlocks a feature
    Upsell {
        /// Current tier
        tier: PlanTier,
        /// Feature key, e.g. `watermark` or `lead-capture-form`
        feature: FeatureKey,
    },
}

/// One feature across every tier
#[derive(Debug, Serialize, Tabled)]
struct MatrixRow {
    feature: &'static str,
    group: &'static str,
    free: String,
    start: String,
    plus: String,
    pro: String,
    premium: String,
}

/// One feature of one tier
#[derive(Debug, Serialize, Tabled)]
struct FeatureRow {
    feature: &'static str,
    group: &'static str,
    value: String,
}

/// A changed dimension
#[derive(Debug, Serialize, Tabled)]
struct DiffRow {
    feature: &'static str,
    group: &'static str,
    from: String,
    to: String,
}

/// Execute plan commands
pub fn execute(args: &PlansArgs, format: OutputFormat) -> Result<(), AppError> {
    let matrix = PermissionMatrix::standard();

    match &args.command {
        PlansCommand::Show { tier: None } => {
            let rows: Vec<MatrixRow> = FeatureKey::ALL
                .iter()
                .map(|&key| {
                    let cell = |tier| matrix.entitlements(tier).value(key).to_string();
                    MatrixRow {
                        feature: key.as_str(),
                        group: key.group().as_str(),
                        free: cell(PlanTier::Free),
                        start: cell(PlanTier::Start),
                        plus: cell(PlanTier::Plus),
                        pro: cell(PlanTier::Pro),
                        premium: cell(PlanTier::Premium),
                    }
                })
                .collect();
            if format == OutputFormat::Table {
                println!("Entitlement matrix {}", matrix.version());
            }
            output::print_list(&rows, format);
        }
        PlansCommand::Show { tier: Some(tier) } => {
            let rows: Vec<FeatureRow> = matrix
                .entitlements(*tier)
                .values()
                .map(|(key, value)| FeatureRow {
                    feature: key.as_str(),
                    group: key.group().as_str(),
                    value: value.to_string(),
                })
                .collect();
            if format == OutputFormat::Table {
                println!("{} plan (matrix {})", tier.display_name(), matrix.version());
            }
            output::print_list(&rows, format);
        }
        PlansCommand::Compare { from, to } => {
            let rows: Vec<DiffRow> = matrix
                .compare(*from, *to)
                .into_iter()
                .map(|d| DiffRow {
                    feature: d.feature.as_str(),
                    group: d.group.as_str(),
                    from: d.from.to_string(),
                    to: d.to.to_string(),
                })
                .collect();
            output::print_list(&rows, format);
        }
        PlansCommand::Upsell { tier, feature } => {
            let available = matrix.is_feature_available(matrix.entitlements(*tier), *feature);
            let suggested = matrix.next_tier_with_feature(*tier, *feature);
            match format {
                OutputFormat::Json => output::print_json(&serde_json::json!({
                    "feature": feature,
                    "current_tier": tier,
                    "available_now": available,
                    "suggested_tier": suggested,
                })),
                OutputFormat::Table => {
                    output::print_kv("Feature", feature.as_str());
                    output::print_kv("Current tier", tier.display_name());
                    output::print_kv("Available now", if available { "yes" } else { "no" });
                    output::print_kv("Suggested tier", suggested.display_name());
                }
            }
        }
    }

    Ok(())
}
