//! Post cache layer.
//!
//! Two caches sit between the service and the storage backend:
//!
//! - **Point cache**: post-by-id, LRU-bounded, no expiry. Remembers
//!   "not found" as well as found posts.
//! - **Query cache**: full scans, attribute-contains scans and key-equality
//!   queries, LRU-bounded with a per-operation TTL.
//!
//! Both coalesce concurrent misses on a key into one backend call and never
//! store backend failures.
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! point_capacity = 56
//! query_capacity = 128
//! scan_ttl_seconds = 600
//! key_query_ttl_seconds = 6000
//! ```

mod config;
mod flight;
mod keys;
mod layer;
mod lock;
pub mod metric_names;
mod point;
mod query;
mod store;

pub use config::CacheConfig;
pub use flight::SingleFlight;
pub use keys::QueryKey;
pub use layer::CachedPostStore;
pub use point::PointCache;
pub use query::QueryCache;
pub use store::{PointStore, QueryStore};
