//! Audit trail entities.

pub mod model;

pub use model::{AuditAction, AuditEvent, AuditResourceType, CreateAuditEvent};
