//! # galleryhub-api
//!
//! HTTP API layer for GalleryHub built on Axum.
//!
//! Identity is established by the upstream gateway and arrives as
//! `x-owner-*` headers; every handler answers with the
//! `{success, data?, error?}` envelope.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use state::AppState;
