//! PostgreSQL store implementations.

pub mod audit;
pub mod directory;
pub mod link;

pub use audit::AuditRepository;
pub use directory::DirectoryRepository;
pub use link::LinkRepository;
