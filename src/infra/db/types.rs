use crate::domain::entities::{Author, Post};

#[derive(sqlx::FromRow)]
pub(crate) struct PostRow {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) body: String,
    pub(crate) categories: Vec<String>,
    pub(crate) tags: Vec<String>,
    pub(crate) author_name: String,
    pub(crate) author_email: String,
    pub(crate) thumbnail: String,
    pub(crate) created_at: i64,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            body: row.body,
            categories: row.categories,
            tags: row.tags,
            author: Author {
                name: row.author_name,
                email: row.author_email,
            },
            thumbnail: row.thumbnail,
            created_at: row.created_at,
        }
    }
}
