//! PostgreSQL implementations of the store traits.

pub mod audit;
pub mod gallery;

pub use audit::AuditLogRepository;
pub use gallery::GalleryRepository;
