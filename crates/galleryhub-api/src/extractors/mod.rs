//! Custom Axum extractors.

pub mod caller;
pub mod json;

pub use caller::{AdminCaller, Caller};
pub use json::ValidatedJson;
