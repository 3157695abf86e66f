//! Storage trait describing the post persistence adapter.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::Post;
use crate::domain::types::{KeyAttribute, ScanAttribute};

/// Failure raised by a storage backend.
///
/// `Clone` so a single failed fetch can be handed to every caller that was
/// waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("malformed record: {message}")]
    Malformed { message: String },
    #[error("post `{id}` already exists")]
    Duplicate { id: String },
    #[error("storage timeout")]
    Timeout,
}

impl StoreError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait PostStore: Send + Sync {
    /// Fetch a single post by id; `Ok(None)` when no such post exists.
    async fn point_get(&self, id: &str) -> Result<Option<Post>, StoreError>;

    /// Posts whose list attribute contains `value`, in storage order.
    async fn scan_contains(
        &self,
        attribute: ScanAttribute,
        value: &str,
    ) -> Result<Vec<Post>, StoreError>;

    /// Every post, in storage order.
    async fn scan_all(&self) -> Result<Vec<Post>, StoreError>;

    /// Posts whose key attribute equals `value`.
    async fn query_equals(&self, key: KeyAttribute, value: &str)
    -> Result<Vec<Post>, StoreError>;

    async fn insert(&self, post: Post) -> Result<(), StoreError>;
}
