//! Plan quota enforcement and the plan catalogue.

pub mod catalog;
pub mod quota;

pub use catalog::{PlanCatalog, PlanSummary, UpsellSuggestion};
pub use quota::{QuotaGuard, QuotaSnapshot};
