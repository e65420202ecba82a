//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Scheduled maintenance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the scheduler runs inside the server process.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Six-field cron expression for the retention sweep.
    #[serde(default = "default_retention_schedule")]
    pub retention_schedule: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            retention_schedule: default_retention_schedule(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_retention_schedule() -> String {
    // 03:30 UTC every day
    "0 30 3 * * *".to_string()
}
