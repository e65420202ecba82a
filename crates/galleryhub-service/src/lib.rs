//! # galleryhub-service
//!
//! The gallery lifecycle and plan-quota engine. Services take their
//! collaborators (store, audit recorder, clock, entitlement matrix) as
//! `Arc`s at construction time and hold no other state, so any number of
//! instances can run against the same store.

pub mod context;
pub mod gallery;
pub mod plan;

pub use context::RequestContext;
pub use gallery::{
    CreateGallery, DowngradeEvent, DowngradeReconciler, LifecycleManager, ReconcileReport,
    RenameGallery, RetentionPurger, SlugGenerator, retention_cutoff,
};
pub use plan::{PlanCatalog, PlanSummary, QuotaGuard, QuotaSnapshot, UpsellSuggestion};
