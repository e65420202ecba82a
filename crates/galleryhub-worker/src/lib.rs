//! Background jobs for GalleryHub.
//!
//! This crate provides:
//! - A job executor that dispatches jobs to the correct handler
//! - A cron scheduler that triggers the retention sweep
//! - The retention sweep job handler

pub mod executor;
pub mod jobs;
pub mod scheduler;

pub use executor::{JobExecutionError, JobExecutor, JobHandler, JobRequest};
pub use jobs::RetentionJobHandler;
pub use scheduler::CronScheduler;
