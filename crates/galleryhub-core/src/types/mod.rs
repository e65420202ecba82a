//! Core type definitions used across the GalleryHub workspace.

pub mod id;
pub mod response;

pub use id::*;
pub use response::{GENERIC_FAILURE_MESSAGE, ServiceError, ServiceResponse};
