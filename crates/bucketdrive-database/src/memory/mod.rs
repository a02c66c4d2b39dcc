//! In-memory store implementations for tests and local development.

pub mod audit;
pub mod directory;
pub mod link;

pub use audit::MemoryAuditStore;
pub use directory::MemoryDirectoryStore;
pub use link::MemoryLinkStore;
