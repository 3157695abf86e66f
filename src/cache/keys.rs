//! Cache key definitions.
//!
//! Point lookups are keyed by the post id string directly; multi-post queries
//! use [`QueryKey`], which carries the operation and its full parameter tuple.

use crate::domain::types::{KeyAttribute, ScanAttribute};

/// Identifies one memoized multi-post query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// Every post.
    ScanAll,
    /// Posts whose list attribute contains `value`.
    ScanContains {
        attribute: ScanAttribute,
        value: String,
    },
    /// Posts whose key attribute equals `value`.
    QueryEquals { key: KeyAttribute, value: String },
}

impl QueryKey {
    pub fn scan_contains(attribute: ScanAttribute, value: impl Into<String>) -> Self {
        Self::ScanContains {
            attribute,
            value: value.into(),
        }
    }

    pub fn query_equals(key: KeyAttribute, value: impl Into<String>) -> Self {
        Self::QueryEquals {
            key,
            value: value.into(),
        }
    }

    /// Short operation label used in logs and metric labels.
    pub fn operation(&self) -> &'static str {
        match self {
            QueryKey::ScanAll => "scan_all",
            QueryKey::ScanContains { .. } => "scan_contains",
            QueryKey::QueryEquals { .. } => "query_equals",
        }
    }
}
