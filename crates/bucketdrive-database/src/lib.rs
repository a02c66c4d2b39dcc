//! # bucketdrive-database
//!
//! Durable stores for BucketDrive: the store traits consumed by the
//! service layer, their PostgreSQL implementations, and in-memory
//! implementations with the same atomicity guarantees.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{AuditStore, DirectoryStore, LinkStore};
