//! Gallery lifecycle configuration.

use serde::{Deserialize, Serialize};

/// Default number of days a trashed gallery is kept before purge.
pub const DEFAULT_RETENTION_DAYS: u32 = 30;

/// Longest retention window any entry point accepts, in days.
pub const MAX_RETENTION_DAYS: u32 = 3650;

/// Default maximum length of the title part of a slug.
pub const DEFAULT_SLUG_TITLE_MAX_LEN: usize = 60;

/// Lifecycle and identifier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Days a gallery stays in the trash before the sweep purges it.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    /// Maximum characters of the normalized title inside a slug.
    #[serde(default = "default_slug_title_max_len")]
    pub slug_title_max_len: usize,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            retention_days: DEFAULT_RETENTION_DAYS,
            slug_title_max_len: DEFAULT_SLUG_TITLE_MAX_LEN,
        }
    }
}

fn default_retention_days() -> u32 {
    DEFAULT_RETENTION_DAYS
}

fn default_slug_title_max_len() -> usize {
    DEFAULT_SLUG_TITLE_MAX_LEN
}
