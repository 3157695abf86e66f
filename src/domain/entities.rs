//! Domain entities mirrored from persistent storage.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

/// A blog post as stored by the backend.
///
/// `body` is markdown unless it begins with `<`, in which case it is treated
/// as pre-rendered HTML. `created_at` is seconds since the Unix epoch and is
/// the only key used for "latest first" ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub author: Author,
    #[serde(default)]
    pub thumbnail: String,
    pub created_at: i64,
}

impl Post {
    /// Returns true when the body is already HTML and must skip markdown rendering.
    pub fn body_is_html(&self) -> bool {
        self.body.starts_with('<')
    }
}

/// Fields supplied by a caller creating a post; the timestamp is assigned on write.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewPost {
    pub id: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub thumbnail: String,
    pub author_name: String,
    pub author_email: String,
}

impl NewPost {
    pub fn into_post(self, created_at: i64) -> Post {
        Post {
            id: self.id,
            title: self.title,
            body: self.body,
            categories: self.categories,
            tags: self.tags,
            author: Author {
                name: self.author_name,
                email: self.author_email,
            },
            thumbnail: self.thumbnail,
            created_at,
        }
    }
}

/// One row of a category or tag frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}
