//! Gallery entity and lifecycle state types.

pub mod model;
pub mod status;

pub use model::{Gallery, NewGallery, PurgedGallery};
pub use status::{GalleryStatus, LifecycleEvent, Transition};
