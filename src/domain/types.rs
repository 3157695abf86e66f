//! Shared domain enumerations for storage queries and listing filters.

use serde::{Deserialize, Serialize};

/// List-valued post attribute that supports "contains" scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanAttribute {
    Categories,
    Tags,
}

impl ScanAttribute {
    pub fn as_str(self) -> &'static str {
        match self {
            ScanAttribute::Categories => "categories",
            ScanAttribute::Tags => "tags",
        }
    }
}

/// Key attribute that supports equality queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAttribute {
    Id,
    AuthorEmail,
}

impl KeyAttribute {
    pub fn as_str(self) -> &'static str {
        match self {
            KeyAttribute::Id => "id",
            KeyAttribute::AuthorEmail => "author_email",
        }
    }
}

/// Filter applied to a listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Category,
    Tag,
}

impl FilterKind {
    pub fn attribute(self) -> ScanAttribute {
        match self {
            FilterKind::Category => ScanAttribute::Categories,
            FilterKind::Tag => ScanAttribute::Tags,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FilterKind::Category => "category",
            FilterKind::Tag => "tag",
        }
    }
}
