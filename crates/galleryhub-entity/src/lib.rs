//! # galleryhub-entity
//!
//! Domain entity models for GalleryHub. Database entities derive
//! `sqlx::FromRow`; the plan module holds the versioned entitlement
//! matrix, which is pure data with no I/O.

pub mod audit;
pub mod gallery;
pub mod plan;
