//! Shared links: minting, evaluation, lifecycle, audit and download.

pub mod access;
pub mod audit;
pub mod download;
pub mod service;
pub mod token;

pub use access::{AccessEvaluator, AccessResolution};
pub use audit::AuditRecorder;
pub use download::{DownloadOutcome, SharedDownloadService, SharedFile};
pub use service::{CreateLinkRequest, ShareLinkService};
pub use token::{TokenGenerator, TokenSource};
