//! Postgres-backed post storage.

mod types;
mod util;

pub use util::map_sqlx_error;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{
    query, query_as,
    postgres::{PgPool, PgPoolOptions},
};

use crate::application::store::{PostStore, StoreError};
use crate::domain::entities::Post;
use crate::domain::types::{KeyAttribute, ScanAttribute};

use self::types::PostRow;

const POST_COLUMNS: &str = "id, title, body, categories, tags, author_name, author_email, \
     thumbnail, created_at";

#[derive(Clone)]
pub struct PostgresPostStore {
    pool: Arc<PgPool>,
}

impl PostgresPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
    }

    pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        query("SELECT 1").execute(self.pool()).await.map(|_| ())
    }

    async fn fetch_posts(&self, sql: &str, bind: Option<&str>) -> Result<Vec<Post>, StoreError> {
        let mut statement = query_as::<_, PostRow>(sql);
        if let Some(value) = bind {
            statement = statement.bind(value);
        }
        let rows = statement
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(Post::from).collect())
    }
}

fn scan_column(attribute: ScanAttribute) -> &'static str {
    match attribute {
        ScanAttribute::Categories => "categories",
        ScanAttribute::Tags => "tags",
    }
}

fn key_column(key: KeyAttribute) -> &'static str {
    match key {
        KeyAttribute::Id => "id",
        KeyAttribute::AuthorEmail => "author_email",
    }
}

#[async_trait]
impl PostStore for PostgresPostStore {
    async fn point_get(&self, id: &str) -> Result<Option<Post>, StoreError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        let row = query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(Post::from))
    }

    async fn scan_contains(
        &self,
        attribute: ScanAttribute,
        value: &str,
    ) -> Result<Vec<Post>, StoreError> {
        let column = scan_column(attribute);
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE $1 = ANY({column}) ORDER BY created_at, id"
        );
        self.fetch_posts(&sql, Some(value)).await
    }

    async fn scan_all(&self) -> Result<Vec<Post>, StoreError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts ORDER BY created_at, id");
        self.fetch_posts(&sql, None).await
    }

    async fn query_equals(
        &self,
        key: KeyAttribute,
        value: &str,
    ) -> Result<Vec<Post>, StoreError> {
        let column = key_column(key);
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE {column} = $1 ORDER BY created_at, id"
        );
        self.fetch_posts(&sql, Some(value)).await
    }

    async fn insert(&self, post: Post) -> Result<(), StoreError> {
        let result = query(
            "INSERT INTO posts (id, title, body, categories, tags, author_name, author_email, \
             thumbnail, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(&post.id)
        .bind(&post.title)
        .bind(&post.body)
        .bind(&post.categories)
        .bind(&post.tags)
        .bind(&post.author.name)
        .bind(&post.author.email)
        .bind(&post.thumbnail)
        .bind(post.created_at)
        .execute(self.pool())
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::Duplicate { id: post.id })
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_come_from_closed_enums() {
        assert_eq!(scan_column(ScanAttribute::Categories), "categories");
        assert_eq!(scan_column(ScanAttribute::Tags), "tags");
        assert_eq!(key_column(KeyAttribute::Id), "id");
        assert_eq!(key_column(KeyAttribute::AuthorEmail), "author_email");
    }
}
