//! # bucketdrive-api
//!
//! HTTP API layer for BucketDrive built on Axum.
//!
//! Provides the shared link endpoints, the bearer-token extractor,
//! middleware (CORS, request logging), DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
