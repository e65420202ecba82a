//! Job executor: dispatches jobs to registered handlers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing;

use galleryhub_core::error::{AppError, ErrorKind};

/// A unit of background work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequest {
    /// Handler key, e.g. `retention_sweep`.
    pub job_type: String,
    /// Handler-specific parameters.
    #[serde(default)]
    pub payload: Value,
}

impl JobRequest {
    /// Creates a request with an empty payload.
    pub fn new(job_type: impl Into<String>) -> Self {
        Self {
            job_type: job_type.into(),
            payload: Value::Null,
        }
    }

    /// Attach a payload.
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Trait for job handler implementations
#[async_trait]
pub trait JobHandler: Send + Sync + std::fmt::Debug {
    /// Get the job type this handler processes
    fn job_type(&self) -> &str;

    /// Execute the job with the given payload
    async fn execute(&self, job: &JobRequest) -> Result<Option<Value>, JobExecutionError>;
}

/// Error from job execution
#[derive(Debug, thiserror::Error)]
pub enum JobExecutionError {
    /// Permanent failure, do not retry
    #[error("Permanent job failure: {0}")]
    Permanent(String),

    /// Transient failure, may retry
    #[error("Transient job failure: {0}")]
    Transient(String),
}

impl JobExecutionError {
    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

impl From<AppError> for JobExecutionError {
    fn from(err: AppError) -> Self {
        match err.kind {
            // Serialization failures and store conflicts clear up on retry.
            ErrorKind::Database | ErrorKind::Conflict | ErrorKind::Internal => {
                Self::Transient(err.to_string())
            }
            _ => Self::Permanent(err.to_string()),
        }
    }
}

/// Dispatches jobs to the appropriate handler based on job_type
#[derive(Debug)]
pub struct JobExecutor {
    /// Registered job handlers by type
    handlers: HashMap<String, Arc<dyn JobHandler>>,
    /// Attempts per job, including the first
    max_attempts: u32,
    /// Delay before the first retry; doubled on each further retry
    retry_backoff: Duration,
}

impl JobExecutor {
    /// Create a new job executor
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            max_attempts: 3,
            retry_backoff: Duration::from_secs(5),
        }
    }

    /// Override the retry policy.
    pub fn with_retry(mut self, max_attempts: u32, backoff: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_backoff = backoff;
        self
    }

    /// Register a job handler
    pub fn register(&mut self, handler: Arc<dyn JobHandler>) {
        let job_type = handler.job_type().to_string();
        tracing::info!("Registered job handler for type '{}'", job_type);
        self.handlers.insert(job_type, handler);
    }

    /// Execute a job by dispatching to the correct handler, retrying
    /// transient failures with exponential backoff.
    pub async fn execute(&self, job: &JobRequest) -> Result<Option<Value>, JobExecutionError> {
        let handler = self.handlers.get(&job.job_type).ok_or_else(|| {
            JobExecutionError::Permanent(format!(
                "No handler registered for job type '{}'",
                job.job_type
            ))
        })?;

        let mut backoff = self.retry_backoff;
        let mut attempt = 1;
        loop {
            tracing::info!(
                "Executing job: type='{}', attempt={}/{}",
                job.job_type,
                attempt,
                self.max_attempts
            );

            match handler.execute(job).await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    tracing::warn!(
                        "Job '{}' failed on attempt {}, retrying in {:?}: {}",
                        job.job_type,
                        attempt,
                        backoff,
                        e
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!("Job '{}' failed: {}", job.job_type, e);
                    return Err(e);
                }
            }
        }
    }

    /// Check if a handler is registered for a job type
    pub fn has_handler(&self, job_type: &str) -> bool {
        self.handlers.contains_key(job_type)
    }

    /// Get the list of registered job types
    pub fn registered_types(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }
}

impl Default for JobExecutor {
    fn default() -> Self {
        Self::new()
    }
}
