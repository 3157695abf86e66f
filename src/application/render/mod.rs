//! Rendering pipeline for post bodies.
//!
//! Markdown is rendered with Comrak and sanitised with Ammonia; bodies that
//! already start with markup pass through untouched. Listing previews are
//! then cut to a word budget. Every stage is pure and deterministic.

mod markdown;
mod truncate;

use thiserror::Error;

pub use markdown::MarkdownRenderer;
pub use truncate::truncate_html_words;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("markdown rendering failed: {message}")]
    Markdown { message: String },
    #[error("malformed html: {message}")]
    Malformed { message: String },
}
