/// Data models for wall-service
///
/// - `Post`: a wall message with its likers and derived counters
/// - `Comment`: an append-only reply owned by exactly one post
/// - `UserStats`: per-author engagement totals derived from a snapshot
/// - `PostRecord`: loosely-typed engagement record from an external feed
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Maximum post length in characters, after trimming
pub const MAX_POST_CHARS: usize = 500;
/// Maximum comment length in characters, after trimming
pub const MAX_COMMENT_CHARS: usize = 300;
/// Label shown for every author on the anonymous wall
pub const ANONYMOUS_LABEL: &str = "Whisperer";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: String,
    pub author_label: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Identifiers of users who currently like this post
    #[serde(skip_serializing)]
    pub liked_by: BTreeSet<String>,
    pub like_count: u64,
    pub comment_count: u64,
}

impl Post {
    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.liked_by.contains(user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: String,
    pub author_label: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Validated input for a new post
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: String,
    pub author_label: String,
    pub content: String,
    pub image_url: Option<String>,
}

/// Validated input for a new comment
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: Uuid,
    pub author_id: String,
    pub author_label: String,
    pub content: String,
}

/// Like state of one user on one post after a like mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeState {
    pub post_id: Uuid,
    pub liked: bool,
    pub like_count: u64,
    /// False when the mutation was a no-op
    #[serde(skip_serializing)]
    pub changed: bool,
}

/// A post as presented to a particular viewer
#[derive(Debug, Clone, Serialize)]
pub struct FeedPost {
    #[serde(flatten)]
    pub post: Post,
    pub liked_by_me: bool,
}

/// Engagement totals of one author
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub author_id: String,
    pub total_posts: u64,
    pub total_likes: u64,
    pub total_comments: u64,
    pub score: u64,
}

impl UserStats {
    pub fn new(author_id: impl Into<String>) -> Self {
        Self {
            author_id: author_id.into(),
            ..Self::default()
        }
    }

    /// posts count once, likes twice, comments once
    pub fn compute_score(total_posts: u64, total_likes: u64, total_comments: u64) -> u64 {
        total_posts
            .saturating_add(total_likes.saturating_mul(2))
            .saturating_add(total_comments)
    }
}

/// Engagement record as delivered by an external change feed.
///
/// Every field is optional because upstream documents are schemaless; the
/// aggregator decides what to do with gaps.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PostRecord {
    pub id: Option<String>,
    #[serde(alias = "authorId", alias = "userId")]
    pub author_id: Option<String>,
    #[serde(alias = "likeCount")]
    pub like_count: Option<f64>,
    #[serde(alias = "commentCount")]
    pub comment_count: Option<f64>,
}

impl PostRecord {
    /// Reads a record from an arbitrary JSON document, treating fields of the
    /// wrong type as absent instead of rejecting the whole document.
    pub fn from_json(value: &serde_json::Value) -> Self {
        let text = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| value.get(*k).and_then(|v| v.as_str()))
                .map(str::to_string)
        };
        let number = |keys: &[&str]| keys.iter().find_map(|k| value.get(*k).and_then(|v| v.as_f64()));

        Self {
            id: text(&["id"]),
            author_id: text(&["author_id", "authorId", "userId"]),
            like_count: number(&["like_count", "likeCount"]),
            comment_count: number(&["comment_count", "commentCount"]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn score_weights_likes_double() {
        assert_eq!(UserStats::compute_score(2, 2, 4), 10);
        assert_eq!(UserStats::compute_score(1, 0, 0), 1);
    }

    #[test]
    fn score_saturates_instead_of_overflowing() {
        assert_eq!(UserStats::compute_score(1, u64::MAX, 1), u64::MAX);
    }

    #[test]
    fn record_from_json_tolerates_wrong_types() {
        let record = PostRecord::from_json(&json!({
            "id": "p1",
            "authorId": "a",
            "likeCount": "lots",
            "commentCount": 3
        }));

        assert_eq!(record.author_id.as_deref(), Some("a"));
        assert_eq!(record.like_count, None);
        assert_eq!(record.comment_count, Some(3.0));
    }

    #[test]
    fn record_from_json_treats_null_author_as_missing() {
        let record = PostRecord::from_json(&json!({"authorId": null, "likeCount": 5}));
        assert!(record.author_id.is_none());
        assert_eq!(record.like_count, Some(5.0));
    }

    #[test]
    fn liked_by_is_not_serialized() {
        let post = Post {
            id: Uuid::nil(),
            author_id: "a".into(),
            author_label: ANONYMOUS_LABEL.into(),
            content: "hi".into(),
            image_url: None,
            created_at: Utc::now(),
            liked_by: ["b".to_string()].into_iter().collect(),
            like_count: 1,
            comment_count: 0,
        };

        let value = serde_json::to_value(&post).unwrap();
        assert!(value.get("liked_by").is_none());
        assert_eq!(value["like_count"], 1);
    }
}
