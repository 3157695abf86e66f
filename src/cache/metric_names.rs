//! Metric names emitted by the cache layer.

pub const METRIC_POINT_HIT_TOTAL: &str = "postcache_cache_point_hit_total";
pub const METRIC_POINT_MISS_TOTAL: &str = "postcache_cache_point_miss_total";
pub const METRIC_POINT_EVICT_TOTAL: &str = "postcache_cache_point_evict_total";
pub const METRIC_QUERY_HIT_TOTAL: &str = "postcache_cache_query_hit_total";
pub const METRIC_QUERY_MISS_TOTAL: &str = "postcache_cache_query_miss_total";
pub const METRIC_QUERY_EXPIRED_TOTAL: &str = "postcache_cache_query_expired_total";
pub const METRIC_QUERY_EVICT_TOTAL: &str = "postcache_cache_query_evict_total";
pub const METRIC_COALESCED_TOTAL: &str = "postcache_cache_coalesced_total";
pub const METRIC_LOCK_POISONED_TOTAL: &str = "postcache_cache_lock_poisoned_total";
pub const METRIC_STORE_FETCH_MS: &str = "postcache_store_fetch_ms";
