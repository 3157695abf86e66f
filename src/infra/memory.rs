//! Process-local post storage used when no database URL is configured.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::application::store::{PostStore, StoreError};
use crate::domain::entities::Post;
use crate::domain::types::{KeyAttribute, ScanAttribute};

/// Posts kept in insertion order behind a lock.
#[derive(Default)]
pub struct InMemoryPostStore {
    posts: RwLock<Vec<Post>>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_posts(posts: Vec<Post>) -> Self {
        Self {
            posts: RwLock::new(posts),
        }
    }

    fn read<T>(&self, f: impl FnOnce(&[Post]) -> T) -> Result<T, StoreError> {
        let posts = self
            .posts
            .read()
            .map_err(|_| StoreError::backend("in-memory store lock poisoned"))?;
        Ok(f(&posts))
    }

    fn filtered(&self, keep: impl Fn(&Post) -> bool) -> Result<Vec<Post>, StoreError> {
        self.read(|posts| posts.iter().filter(|post| keep(post)).cloned().collect())
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn point_get(&self, id: &str) -> Result<Option<Post>, StoreError> {
        self.read(|posts| posts.iter().find(|post| post.id == id).cloned())
    }

    async fn scan_contains(
        &self,
        attribute: ScanAttribute,
        value: &str,
    ) -> Result<Vec<Post>, StoreError> {
        self.filtered(|post| {
            let values = match attribute {
                ScanAttribute::Categories => &post.categories,
                ScanAttribute::Tags => &post.tags,
            };
            values.iter().any(|candidate| candidate == value)
        })
    }

    async fn scan_all(&self) -> Result<Vec<Post>, StoreError> {
        self.read(<[Post]>::to_vec)
    }

    async fn query_equals(
        &self,
        key: KeyAttribute,
        value: &str,
    ) -> Result<Vec<Post>, StoreError> {
        self.filtered(|post| match key {
            KeyAttribute::Id => post.id == value,
            KeyAttribute::AuthorEmail => post.author.email == value,
        })
    }

    async fn insert(&self, post: Post) -> Result<(), StoreError> {
        let mut posts = self
            .posts
            .write()
            .map_err(|_| StoreError::backend("in-memory store lock poisoned"))?;
        if posts.iter().any(|existing| existing.id == post.id) {
            return Err(StoreError::Duplicate { id: post.id });
        }
        posts.push(post);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Author;

    fn post(id: &str, categories: &[&str], email: &str) -> Post {
        Post {
            id: id.to_string(),
            title: id.to_string(),
            body: String::new(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            tags: Vec::new(),
            author: Author {
                name: "Someone".to_string(),
                email: email.to_string(),
            },
            thumbnail: String::new(),
            created_at: 0,
        }
    }

    #[tokio::test]
    async fn contains_scan_matches_whole_values() {
        let store = InMemoryPostStore::with_posts(vec![
            post("1", &["rust", "web"], "a@x"),
            post("2", &["rustacean"], "a@x"),
        ]);

        let hits = store
            .scan_contains(ScanAttribute::Categories, "rust")
            .await
            .expect("scan");

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "1");
    }

    #[tokio::test]
    async fn key_query_filters_by_author_email() {
        let store = InMemoryPostStore::with_posts(vec![
            post("1", &[], "a@x"),
            post("2", &[], "b@x"),
            post("3", &[], "a@x"),
        ]);

        let hits = store
            .query_equals(KeyAttribute::AuthorEmail, "a@x")
            .await
            .expect("query");

        let ids: Vec<_> = hits.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["1", "3"]);
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_ids_and_keeps_order() {
        let store = InMemoryPostStore::new();
        store.insert(post("1", &[], "a@x")).await.expect("first");
        store.insert(post("2", &[], "a@x")).await.expect("second");

        let err = store.insert(post("1", &[], "b@x")).await.expect_err("dup");

        assert_eq!(err, StoreError::Duplicate { id: "1".to_string() });
        let ids: Vec<_> = store
            .scan_all()
            .await
            .expect("scan")
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, ["1", "2"]);
        assert!(store.point_get("3").await.expect("get").is_none());
    }
}
