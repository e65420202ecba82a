//! Operator endpoints for billing events and maintenance.

pub mod reconcile;
pub mod sweep;
