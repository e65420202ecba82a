//! Trash retention sweep job handler.

use async_trait::async_trait;
use serde_json::Value;
use tracing;

use galleryhub_core::config::lifecycle::MAX_RETENTION_DAYS;
use galleryhub_service::RetentionPurger;

use crate::executor::{JobExecutionError, JobHandler, JobRequest};

/// Job type dispatched by the scheduler for the retention sweep.
pub const RETENTION_SWEEP: &str = "retention_sweep";

/// Purges galleries that outstayed the trash window.
///
/// The payload may carry `retention_days` (at most
/// [`MAX_RETENTION_DAYS`]) to override the purger's configured window for
/// a single run.
#[derive(Debug)]
pub struct RetentionJobHandler {
    /// Purger doing the actual work
    purger: RetentionPurger,
}

impl RetentionJobHandler {
    /// Create a new retention job handler
    pub fn new(purger: RetentionPurger) -> Self {
        Self { purger }
    }

    fn retention_days(&self, payload: &Value) -> Result<u32, JobExecutionError> {
        match payload.get("retention_days") {
            None | Some(Value::Null) => Ok(self.purger.retention_days()),
            Some(v) => v
                .as_u64()
                .and_then(|d| u32::try_from(d).ok())
                .filter(|d| *d <= MAX_RETENTION_DAYS)
                .ok_or_else(|| {
                    JobExecutionError::Permanent(format!("Invalid retention_days: {}", v))
                }),
        }
    }
}

#[async_trait]
impl JobHandler for RetentionJobHandler {
    fn job_type(&self) -> &str {
        RETENTION_SWEEP
    }

    async fn execute(&self, job: &JobRequest) -> Result<Option<Value>, JobExecutionError> {
        let days = self.retention_days(&job.payload)?;
        tracing::info!("Running retention sweep (retention_days={})", days);

        let purged = self.purger.sweep(days).await?;

        tracing::info!("Retention sweep removed {} galleries", purged.len());

        Ok(Some(serde_json::json!({
            "task": RETENTION_SWEEP,
            "retention_days": days,
            "purged_count": purged.len(),
            "purged": purged,
        })))
    }
}
