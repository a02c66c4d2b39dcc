//! Per-bucket permission entities.

pub mod model;

pub use model::{BucketPermission, PermissionSet, PermissionSnapshot};
