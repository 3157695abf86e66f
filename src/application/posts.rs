//! Post-facing operations: detail pages, listings, counts and submissions.
//!
//! Every read goes through the [`PostStore`] handed to [`PostService::new`],
//! which in a running server is the caching decorator. Derived views are
//! recomputed per call from the (possibly cached) post lists.

use std::sync::Arc;

use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::application::aggregate::{count_values, preview, sort_by_date_desc};
use crate::application::error::AppError;
use crate::application::render::{MarkdownRenderer, truncate_html_words};
use crate::application::store::PostStore;
use crate::domain::entities::{Author, CategoryCount, NewPost, Post};
use crate::domain::error::DomainError;
use crate::domain::types::{FilterKind, KeyAttribute, ScanAttribute};

const DEFAULT_PREVIEW_SIZE: usize = 3;
const DEFAULT_FILTERED_PREVIEW_SIZE: usize = 5;
const DEFAULT_TRUNCATE_WORDS: usize = 85;

/// Sizes applied to listing pages.
#[derive(Debug, Clone, Copy)]
pub struct ListingConfig {
    pub preview_size: usize,
    pub filtered_preview_size: usize,
    pub truncate_words: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            preview_size: DEFAULT_PREVIEW_SIZE,
            filtered_preview_size: DEFAULT_FILTERED_PREVIEW_SIZE,
            truncate_words: DEFAULT_TRUNCATE_WORDS,
        }
    }
}

impl From<&crate::config::ListingSettings> for ListingConfig {
    fn from(settings: &crate::config::ListingSettings) -> Self {
        Self {
            preview_size: settings.preview_size.get(),
            filtered_preview_size: settings.filtered_preview_size.get(),
            truncate_words: settings.truncate_words.get(),
        }
    }
}

/// A post with its body rendered to HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedPost {
    pub id: String,
    pub title: String,
    pub html: String,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub author: Author,
    pub thumbnail: String,
    pub created_at: i64,
}

/// Listing entry: rendered body cut to the configured word budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostPreview {
    pub id: String,
    pub title: String,
    pub excerpt_html: String,
    pub truncated: bool,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub author: Author,
    pub thumbnail: String,
    pub created_at: i64,
}

pub struct PostService {
    store: Arc<dyn PostStore>,
    renderer: MarkdownRenderer,
    listing: ListingConfig,
}

impl PostService {
    pub fn new(store: Arc<dyn PostStore>, listing: ListingConfig) -> Self {
        Self {
            store,
            renderer: MarkdownRenderer::new(),
            listing,
        }
    }

    pub fn listing(&self) -> &ListingConfig {
        &self.listing
    }

    pub async fn get_post(&self, id: &str) -> Result<RenderedPost, AppError> {
        let post = self
            .store
            .point_get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("post"))?;
        let html = self.renderer.render_body(&post)?;
        Ok(rendered(post, html))
    }

    /// Newest posts first, at most `limit` of them.
    pub async fn get_listing(&self, limit: usize) -> Result<Vec<PostPreview>, AppError> {
        let posts = self.posts_by_date().await?;
        self.previews(preview(&posts, limit))
    }

    /// Newest posts in a category or carrying a tag, at most `limit`.
    ///
    /// Unlike a plain preview of the scan, matches are re-sorted newest first
    /// before the first `limit` are taken, so storage order never decides
    /// which posts appear.
    pub async fn get_filtered(
        &self,
        kind: FilterKind,
        value: &str,
        limit: usize,
    ) -> Result<Vec<PostPreview>, AppError> {
        let posts = self.store.scan_contains(kind.attribute(), value).await?;
        let posts = sort_by_date_desc(posts);
        debug!(
            target = "postcache::application::posts",
            filter = kind.as_str(),
            value,
            matched = posts.len(),
            "filtered listing"
        );
        self.previews(preview(&posts, limit))
    }

    pub async fn get_category_counts(&self) -> Result<Vec<CategoryCount>, AppError> {
        let posts = self.store.scan_all().await?;
        Ok(count_values(&posts, ScanAttribute::Categories))
    }

    pub async fn get_tag_counts(&self) -> Result<Vec<CategoryCount>, AppError> {
        let posts = self.store.scan_all().await?;
        Ok(count_values(&posts, ScanAttribute::Tags))
    }

    /// Every post by the author with `email`, newest first.
    pub async fn get_posts_by_author(&self, email: &str) -> Result<Vec<PostPreview>, AppError> {
        let posts = self
            .store
            .query_equals(KeyAttribute::AuthorEmail, email)
            .await?;
        self.previews(&sort_by_date_desc(posts))
    }

    pub async fn get_latest(&self) -> Result<Post, AppError> {
        self.posts_by_date()
            .await?
            .into_iter()
            .next()
            .ok_or(AppError::NotFound)
    }

    /// Store a new post stamped with the current time. Cached listings keep
    /// serving their previous contents until they expire.
    pub async fn create_post(&self, new_post: NewPost) -> Result<Post, AppError> {
        validate(&new_post)?;

        let created_at = OffsetDateTime::now_utc().unix_timestamp();
        let post = new_post.into_post(created_at);
        self.store.insert(post.clone()).await?;

        info!(
            target = "postcache::application::posts",
            post_id = %post.id,
            created_at,
            "post created"
        );
        Ok(post)
    }

    async fn posts_by_date(&self) -> Result<Vec<Post>, AppError> {
        Ok(sort_by_date_desc(self.store.scan_all().await?))
    }

    fn previews(&self, posts: &[Post]) -> Result<Vec<PostPreview>, AppError> {
        posts.iter().map(|post| self.preview_of(post)).collect()
    }

    fn preview_of(&self, post: &Post) -> Result<PostPreview, AppError> {
        let html = self.renderer.render_body(post)?;
        let excerpt_html = truncate_html_words(&html, self.listing.truncate_words)?;
        let truncated = excerpt_html != html;
        Ok(PostPreview {
            id: post.id.clone(),
            title: post.title.clone(),
            excerpt_html,
            truncated,
            categories: post.categories.clone(),
            tags: post.tags.clone(),
            author: post.author.clone(),
            thumbnail: post.thumbnail.clone(),
            created_at: post.created_at,
        })
    }
}

fn rendered(post: Post, html: String) -> RenderedPost {
    RenderedPost {
        id: post.id,
        title: post.title,
        html,
        categories: post.categories,
        tags: post.tags,
        author: post.author,
        thumbnail: post.thumbnail,
        created_at: post.created_at,
    }
}

fn validate(new_post: &NewPost) -> Result<(), AppError> {
    let required = [
        ("id", &new_post.id),
        ("title", &new_post.title),
        ("body", &new_post.body),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(AppError::validation(format!("{field} must not be empty")));
        }
    }
    Ok(())
}
