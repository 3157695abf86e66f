//! Memoized post-by-id lookups.

use std::sync::Arc;
use std::time::Instant;

use metrics::histogram;
use tracing::warn;

use crate::application::store::{PostStore, StoreError};
use crate::domain::entities::Post;

use super::config::CacheConfig;
use super::flight::SingleFlight;
use super::metric_names::METRIC_STORE_FETCH_MS;
use super::store::PointStore;

/// Get-or-fetch wrapper over [`PointStore`].
///
/// A completed lookup is kept until LRU eviction, whether the post was found
/// or not. Backend errors reach every waiting caller and are not stored.
pub struct PointCache {
    backend: Arc<dyn PostStore>,
    entries: Arc<PointStore>,
    flight: SingleFlight<String, Option<Post>>,
}

impl PointCache {
    pub fn new(config: &CacheConfig, backend: Arc<dyn PostStore>) -> Self {
        Self {
            backend,
            entries: Arc::new(PointStore::new(config)),
            flight: SingleFlight::new("point"),
        }
    }

    pub async fn get(&self, id: &str) -> Result<Option<Post>, StoreError> {
        if let Some(cached) = self.entries.get(id) {
            return Ok(cached);
        }

        let key = id.to_string();
        let backend = Arc::clone(&self.backend);
        let entries = Arc::clone(&self.entries);
        let fetch_key = key.clone();

        self.flight
            .run(
                key,
                || self.entries.peek(id),
                move || async move {
                    let started_at = Instant::now();
                    let result = backend.point_get(&fetch_key).await;
                    histogram!(METRIC_STORE_FETCH_MS, "operation" => "point_get")
                        .record(started_at.elapsed().as_secs_f64() * 1000.0);

                    match &result {
                        Ok(value) => {
                            entries.put(fetch_key, value.clone());
                        }
                        Err(err) => warn!(
                            target = "postcache::cache::point",
                            post_id = %fetch_key,
                            error = %err,
                            "point lookup failed; outcome not cached"
                        ),
                    }
                    result
                },
            )
            .await
    }

    /// Direct access to the backing storage, for inspection and tests.
    pub fn entries(&self) -> &PointStore {
        &self.entries
    }
}
