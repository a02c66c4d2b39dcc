//! Shared link domain entities.

pub mod decision;
pub mod model;

pub use decision::AccessDecision;
pub use model::{CreateLinkRecord, LinkRecord, LinkUpdate};
