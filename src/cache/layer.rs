//! Caching decorator over a [`PostStore`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::application::store::{PostStore, StoreError};
use crate::domain::entities::Post;
use crate::domain::types::{KeyAttribute, ScanAttribute};

use super::config::CacheConfig;
use super::keys::QueryKey;
use super::point::PointCache;
use super::query::QueryCache;

/// Routes reads through the point and query caches.
///
/// Writes go straight to the backend and leave both caches untouched, so a
/// new post stays invisible to cached scans until their entries expire or
/// are evicted.
pub struct CachedPostStore {
    backend: Arc<dyn PostStore>,
    points: PointCache,
    queries: QueryCache,
}

impl CachedPostStore {
    pub fn new(config: &CacheConfig, backend: Arc<dyn PostStore>) -> Self {
        Self {
            points: PointCache::new(config, Arc::clone(&backend)),
            queries: QueryCache::new(config, Arc::clone(&backend)),
            backend,
        }
    }

    pub fn points(&self) -> &PointCache {
        &self.points
    }

    pub fn queries(&self) -> &QueryCache {
        &self.queries
    }

    /// Drop every cached entry. Used on shutdown and by tests.
    pub fn clear(&self) {
        self.points.entries().clear();
        self.queries.entries().clear();
    }
}

#[async_trait]
impl PostStore for CachedPostStore {
    async fn point_get(&self, id: &str) -> Result<Option<Post>, StoreError> {
        self.points.get(id).await
    }

    async fn scan_contains(
        &self,
        attribute: ScanAttribute,
        value: &str,
    ) -> Result<Vec<Post>, StoreError> {
        self.queries
            .get(QueryKey::scan_contains(attribute, value))
            .await
    }

    async fn scan_all(&self) -> Result<Vec<Post>, StoreError> {
        self.queries.get(QueryKey::ScanAll).await
    }

    async fn query_equals(
        &self,
        key: KeyAttribute,
        value: &str,
    ) -> Result<Vec<Post>, StoreError> {
        self.queries.get(QueryKey::query_equals(key, value)).await
    }

    async fn insert(&self, post: Post) -> Result<(), StoreError> {
        let post_id = post.id.clone();
        self.backend.insert(post).await?;
        debug!(
            target = "postcache::cache::layer",
            post_id = %post_id,
            "post stored; cached scans refresh on expiry"
        );
        Ok(())
    }
}
