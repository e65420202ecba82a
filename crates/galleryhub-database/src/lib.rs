//! # galleryhub-database
//!
//! Persistence for GalleryHub: the [`GalleryStore`] and [`AuditRecorder`]
//! traits the engine is written against, their PostgreSQL repositories,
//! and an in-memory store for single-node use and tests.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryGalleryStore;
pub use store::{
    AuditRecorder, ChangeOutcome, GalleryRename, GalleryStore, InsertOutcome, SlugLookup,
    StatusChange,
};
