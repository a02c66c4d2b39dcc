//! User domain entities.

pub mod model;
pub mod role;

pub use model::UserProfile;
pub use role::UserRole;
