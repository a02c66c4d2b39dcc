//! # bucketdrive-core
//!
//! Core crate for BucketDrive. Contains the unified error system,
//! configuration schemas, the clock abstraction, and the object-storage
//! collaborator trait.
//!
//! This crate has **no** internal dependencies on other BucketDrive crates.

pub mod clock;
pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::AppError;
pub use result::AppResult;
