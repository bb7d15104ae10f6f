//! Projection engine configuration loaded from environment variables.

use std::time::Duration;

const DEFAULT_SHARDS: usize = 16;

/// Tuning knobs for repositories and projection services.
///
/// Reads from environment variables:
/// - `PROJECTION_SHARDS`: lock shards of the in-memory repository (default: `16`)
/// - `PROJECTION_STORAGE_TIMEOUT_MS`: deadline for each repository call
///   (default: unset, no deadline)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionConfig {
    pub repository_shards: usize,
    pub storage_timeout: Option<Duration>,
}

impl ProjectionConfig {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    ///
    /// Unparseable values fall back to their defaults, as does a shard count of 0.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            repository_shards: lookup("PROJECTION_SHARDS")
                .and_then(|v| v.parse().ok())
                .filter(|shards: &usize| *shards > 0)
                .unwrap_or(DEFAULT_SHARDS),
            storage_timeout: lookup("PROJECTION_STORAGE_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis),
        }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            repository_shards: DEFAULT_SHARDS,
            storage_timeout: None,
        }
    }
}
