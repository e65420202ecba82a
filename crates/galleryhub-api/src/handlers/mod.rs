//! HTTP request handlers organized by domain.

pub mod admin;
pub mod gallery;
pub mod health;
pub mod plan;
pub mod quota;
