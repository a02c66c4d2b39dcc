//! # bucketdrive-entity
//!
//! Domain entity models for BucketDrive. Every struct in this crate
//! represents a database row or a domain value object. Database entities
//! additionally derive `sqlx::FromRow`.

pub mod audit;
pub mod link;
pub mod permission;
pub mod user;
