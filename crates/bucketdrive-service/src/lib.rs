//! # bucketdrive-service
//!
//! Business logic for BucketDrive's shared links. Orchestrates the link,
//! audit and directory stores, the authorization gate and object storage.

pub mod context;
pub mod share;

pub use context::RequestContext;
pub use share::{
    AccessEvaluator, AccessResolution, AuditRecorder, CreateLinkRequest, DownloadOutcome,
    ShareLinkService, SharedDownloadService, SharedFile, TokenGenerator, TokenSource,
};
