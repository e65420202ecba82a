//! Convenience result type alias for GalleryHub.

use crate::error::AppError;

/// A specialized `Result` type for GalleryHub operations.
pub type AppResult<T> = Result<T, AppError>;
