//! Derived views over cached post lists.
//!
//! Everything here is pure: the functions never reach storage and never
//! mutate their input.

use crate::domain::entities::{CategoryCount, Post};
use crate::domain::types::ScanAttribute;

/// Newest first. Posts sharing a timestamp keep their relative input order.
pub fn sort_by_date_desc(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    posts
}

/// Frequency table for a list attribute.
///
/// Names appear in the order they are first seen while walking `posts` and
/// each post's list front to back.
pub fn count_values(posts: &[Post], attribute: ScanAttribute) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = Vec::new();

    for value in posts.iter().flat_map(|post| values_of(post, attribute)) {
        match counts.iter_mut().find(|entry| entry.name == *value) {
            Some(entry) => entry.count += 1,
            None => counts.push(CategoryCount {
                name: value.clone(),
                count: 1,
            }),
        }
    }

    counts
}

/// The first `limit` posts, in the order given.
pub fn preview(posts: &[Post], limit: usize) -> &[Post] {
    &posts[..posts.len().min(limit)]
}

fn values_of(post: &Post, attribute: ScanAttribute) -> &[String] {
    match attribute {
        ScanAttribute::Categories => &post.categories,
        ScanAttribute::Tags => &post.tags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Author;

    fn post(id: &str, created_at: i64, categories: &[&str]) -> Post {
        Post {
            id: id.to_string(),
            title: id.to_uppercase(),
            body: String::new(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            tags: Vec::new(),
            author: Author {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
            },
            thumbnail: String::new(),
            created_at,
        }
    }

    fn ids(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn sorts_newest_first() {
        let sorted = sort_by_date_desc(vec![post("a", 1, &[]), post("b", 3, &[]), post("c", 2, &[])]);
        assert_eq!(ids(&sorted), ["b", "c", "a"]);
    }

    #[test]
    fn sort_is_stable_for_equal_timestamps() {
        let sorted = sort_by_date_desc(vec![
            post("x", 5, &[]),
            post("old", 1, &[]),
            post("y", 5, &[]),
            post("z", 5, &[]),
        ]);
        assert_eq!(ids(&sorted), ["x", "y", "z", "old"]);
    }

    #[test]
    fn counts_in_first_seen_order() {
        let posts = vec![
            post("1", 0, &["a", "b"]),
            post("2", 0, &["a"]),
            post("3", 0, &["c"]),
        ];

        let counts = count_values(&posts, ScanAttribute::Categories);

        assert_eq!(
            counts,
            vec![
                CategoryCount { name: "a".into(), count: 2 },
                CategoryCount { name: "b".into(), count: 1 },
                CategoryCount { name: "c".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn counts_tags_separately_from_categories() {
        let mut tagged = post("1", 0, &["news"]);
        tagged.tags = vec!["rust".into(), "rust".into()];

        let counts = count_values(&[tagged], ScanAttribute::Tags);

        assert_eq!(counts, vec![CategoryCount { name: "rust".into(), count: 2 }]);
    }

    #[test]
    fn counts_of_nothing_are_empty() {
        assert!(count_values(&[], ScanAttribute::Categories).is_empty());
        assert!(count_values(&[post("1", 0, &[])], ScanAttribute::Categories).is_empty());
    }

    #[test]
    fn preview_takes_prefix_without_reordering() {
        let posts = vec![post("a", 1, &[]), post("b", 9, &[]), post("c", 5, &[])];

        assert_eq!(ids(preview(&posts, 2)), ["a", "b"]);
        assert_eq!(ids(preview(&posts, 10)), ["a", "b", "c"]);
        assert!(preview(&posts, 0).is_empty());
    }
}
