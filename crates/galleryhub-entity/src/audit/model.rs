//! Audit log entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use galleryhub_core::types::{AuditLogId, OwnerId};

/// Well-known audit action names.
pub mod actions {
    /// A tier downgrade was reconciled against the owner's active galleries.
    pub const DOWNGRADE_RECONCILED: &str = "plan.downgrade_reconciled";
    /// The retention sweep purged trashed galleries.
    pub const RETENTION_PURGED: &str = "gallery.retention_purged";
}

/// An immutable audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLogEntry {
    /// Unique audit entry identifier.
    pub id: AuditLogId,
    /// The owner the action concerns.
    pub owner_id: OwnerId,
    /// The action that was performed (e.g. `"plan.downgrade_reconciled"`).
    pub action: String,
    /// The type of target resource (e.g. `"owner"`, `"gallery"`).
    pub target_type: String,
    /// The target resource ID (if applicable).
    pub target_id: Option<Uuid>,
    /// Additional details about the action (JSON).
    pub details: Option<serde_json::Value>,
    /// When the action occurred.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuditLogEntry {
    /// The owner the action concerns.
    pub owner_id: OwnerId,
    /// The action performed.
    pub action: String,
    /// Target resource type.
    pub target_type: String,
    /// Target resource ID.
    pub target_id: Option<Uuid>,
    /// Additional details.
    pub details: Option<serde_json::Value>,
    /// When the action occurred, as seen by the engine clock.
    pub created_at: DateTime<Utc>,
}
