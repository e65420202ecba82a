//! # galleryhub-core
//!
//! Core crate for GalleryHub. Contains configuration schemas, typed
//! identifiers, the caller-facing response envelope, the injectable clock,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other GalleryHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
