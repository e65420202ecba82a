//! CLI command definitions and dispatch.

pub mod migrate;
pub mod plans;
pub mod quota;
pub mod reconcile;
pub mod serve;
pub mod sweep;

use clap::{Parser, Subcommand};

use galleryhub_core::config::AppConfig;
use galleryhub_core::error::AppError;
use galleryhub_database::DatabasePool;

use crate::output::OutputFormat;

/// GalleryHub: gallery lifecycle and plan quotas
#[derive(Debug, Parser)]
#[command(name = "galleryhub", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment (`config/{env}.toml` overlays `config/default.toml`)
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the GalleryHub server
    Serve(serve::ServeArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Inspect the plan entitlement matrix
    Plans(plans::PlansArgs),
    /// Show an owner's gallery quota
    Quota(quota::QuotaArgs),
    /// Archive excess galleries after a tier change
    Reconcile(reconcile::ReconcileArgs),
    /// Purge galleries past the trash retention window
    Sweep(sweep::SweepArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, &self.env).await,
            Commands::Migrate(args) => migrate::execute(args, &self.env, self.format).await,
            Commands::Plans(args) => plans::execute(args, self.format),
            Commands::Quota(args) => quota::execute(args, &self.env, self.format).await,
            Commands::Reconcile(args) => reconcile::execute(args, &self.env, self.format).await,
            Commands::Sweep(args) => sweep::execute(args, &self.env, self.format).await,
        }
    }
}

/// Helper: load configuration for an environment
pub fn load_config(env: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(env)
}

/// Helper: open the database pool from config
pub async fn connect(config: &AppConfig) -> Result<DatabasePool, AppError> {
    DatabasePool::connect(&config.database).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_reconcile_arguments() {
        let cli = Cli::try_parse_from([
            "galleryhub",
            "--format",
            "json",
            "reconcile",
            "--owner",
            "6f1c2d3e-4b5a-4c6d-8e7f-9a0b1c2d3e4f",
            "--to",
            "free",
            "--limit",
            "unlimited",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Reconcile(args) => {
                assert_eq!(args.to, galleryhub_entity::plan::PlanTier::Free);
                assert_eq!(args.limit, Some(galleryhub_entity::plan::Limit::Unlimited));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_sweep_days_are_bounded() {
        let cli = Cli::try_parse_from(["galleryhub", "sweep", "--days", "3650", "--dry-run"]).unwrap();
        match cli.command {
            Commands::Sweep(args) => {
                assert_eq!(args.days, Some(3650));
                assert!(args.dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        for days in ["3651", "100000000"] {
            assert!(Cli::try_parse_from(["galleryhub", "sweep", "--days", days]).is_err());
        }
    }
}
