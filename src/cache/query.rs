//! Memoized multi-post queries with per-operation lifetimes.

use std::sync::Arc;
use std::time::Instant;

use metrics::histogram;
use tracing::warn;

use crate::application::store::{PostStore, StoreError};
use crate::domain::entities::Post;

use super::config::CacheConfig;
use super::flight::SingleFlight;
use super::keys::QueryKey;
use super::metric_names::METRIC_STORE_FETCH_MS;
use super::store::QueryStore;

/// Get-or-fetch wrapper over [`QueryStore`].
pub struct QueryCache {
    backend: Arc<dyn PostStore>,
    entries: Arc<QueryStore>,
    flight: SingleFlight<QueryKey, Vec<Post>>,
}

impl QueryCache {
    pub fn new(config: &CacheConfig, backend: Arc<dyn PostStore>) -> Self {
        Self {
            backend,
            entries: Arc::new(QueryStore::new(config)),
            flight: SingleFlight::new("query"),
        }
    }

    pub async fn get(&self, key: QueryKey) -> Result<Vec<Post>, StoreError> {
        if let Some(cached) = self.entries.get(&key) {
            return Ok(cached);
        }

        let backend = Arc::clone(&self.backend);
        let entries = Arc::clone(&self.entries);
        let fetch_key = key.clone();
        let probe_key = key.clone();

        self.flight
            .run(
                key,
                || self.entries.peek(&probe_key),
                move || async move {
                    let operation = fetch_key.operation();
                    let started_at = Instant::now();
                    let result = execute(backend.as_ref(), &fetch_key).await;
                    histogram!(METRIC_STORE_FETCH_MS, "operation" => operation)
                        .record(started_at.elapsed().as_secs_f64() * 1000.0);

                    match &result {
                        Ok(posts) => {
                            entries.put(fetch_key, posts.clone());
                        }
                        Err(err) => warn!(
                            target = "postcache::cache::query",
                            operation,
                            key = ?fetch_key,
                            error = %err,
                            "query failed; outcome not cached"
                        ),
                    }
                    result
                },
            )
            .await
    }

    /// Direct access to the backing storage, for inspection and tests.
    pub fn entries(&self) -> &QueryStore {
        &self.entries
    }
}

async fn execute(backend: &dyn PostStore, key: &QueryKey) -> Result<Vec<Post>, StoreError> {
    match key {
        QueryKey::ScanAll => backend.scan_all().await,
        QueryKey::ScanContains { attribute, value } => {
            backend.scan_contains(*attribute, value).await
        }
        QueryKey::QueryEquals { key, value } => backend.query_equals(*key, value).await,
    }
}
