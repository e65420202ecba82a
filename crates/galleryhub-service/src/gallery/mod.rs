//! Gallery lifecycle, slug generation, downgrade reconciliation, and
//! retention.

pub mod lifecycle;
pub mod reconcile;
pub mod retention;
pub mod slug;

pub use lifecycle::{ACCESS_DENIED_MESSAGE, CreateGallery, LifecycleManager, RenameGallery};
pub use reconcile::{DowngradeEvent, DowngradeReconciler, ReconcileReport};
pub use retention::{RetentionPurger, retention_cutoff};
pub use slug::SlugGenerator;
