//! # bucketdrive-worker
//!
//! Scheduled background jobs for BucketDrive.

pub mod executor;
pub mod jobs;
pub mod scheduler;

pub use executor::{JobExecutionError, JobHandler};
pub use jobs::LinkSweepJobHandler;
pub use scheduler::CronScheduler;
