//! Cache configuration.
//!
//! Controls the point cache and the query cache via `[cache]` in `postcache.toml`.

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Deserialize;

use super::keys::QueryKey;

// Default values for cache configuration
const DEFAULT_POINT_CAPACITY: usize = 56;
const DEFAULT_QUERY_CAPACITY: usize = 128;
const DEFAULT_SCAN_TTL_SECS: u64 = 600;
const DEFAULT_KEY_QUERY_TTL_SECS: u64 = 6000;

/// Cache configuration from `postcache.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum posts memoized by id.
    pub point_capacity: usize,
    /// Maximum query results memoized across all operations.
    pub query_capacity: usize,
    /// Lifetime of full-scan and attribute-scan results, in seconds.
    pub scan_ttl_secs: u64,
    /// Lifetime of key-equality query results, in seconds.
    pub key_query_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            point_capacity: DEFAULT_POINT_CAPACITY,
            query_capacity: DEFAULT_QUERY_CAPACITY,
            scan_ttl_secs: DEFAULT_SCAN_TTL_SECS,
            key_query_ttl_secs: DEFAULT_KEY_QUERY_TTL_SECS,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            point_capacity: settings.point_capacity.get(),
            query_capacity: settings.query_capacity.get(),
            scan_ttl_secs: settings.scan_ttl.as_secs(),
            key_query_ttl_secs: settings.key_query_ttl.as_secs(),
        }
    }
}

impl CacheConfig {
    /// Returns the point capacity as NonZeroUsize, clamping to 1 if zero.
    pub fn point_capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.point_capacity).unwrap_or(NonZeroUsize::MIN)
    }

    /// Returns the query capacity as NonZeroUsize, clamping to 1 if zero.
    pub fn query_capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.query_capacity).unwrap_or(NonZeroUsize::MIN)
    }

    /// Lifetime of a cached result for the given query.
    pub fn ttl_for(&self, key: &QueryKey) -> Duration {
        match key {
            QueryKey::ScanAll | QueryKey::ScanContains { .. } => {
                Duration::from_secs(self.scan_ttl_secs)
            }
            QueryKey::QueryEquals { .. } => Duration::from_secs(self.key_query_ttl_secs),
        }
    }
}
