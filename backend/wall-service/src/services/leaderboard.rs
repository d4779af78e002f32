// ============================================
// Engagement Leaderboard
// ============================================
//
// Folds a full post snapshot into per-author engagement totals.
//
// score = posts * 1 + likes * 2 + comments * 1
//
// Output is sorted by descending score. The sort is stable over the order in
// which each author's first post was encountered, so with newest-first
// snapshots a tie goes to the author who posted most recently.

use crate::models::{Post, PostRecord, UserStats};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Read-only engagement view over anything that looks like a post
pub trait Engagement {
    /// Author identifier, `None` when missing or blank
    fn author_id(&self) -> Option<&str>;
    /// Like count, already clamped to a non-negative integer
    fn like_count(&self) -> u64;
    /// Comment count, already clamped to a non-negative integer
    fn comment_count(&self) -> u64;
}

impl Engagement for Post {
    fn author_id(&self) -> Option<&str> {
        non_blank(&self.author_id)
    }

    fn like_count(&self) -> u64 {
        self.like_count
    }

    fn comment_count(&self) -> u64 {
        self.comment_count
    }
}

impl Engagement for PostRecord {
    fn author_id(&self) -> Option<&str> {
        self.author_id.as_deref().and_then(non_blank)
    }

    fn like_count(&self) -> u64 {
        clamp_count(self.like_count)
    }

    fn comment_count(&self) -> u64 {
        clamp_count(self.comment_count)
    }
}

impl<T: Engagement + ?Sized> Engagement for &T {
    fn author_id(&self) -> Option<&str> {
        (**self).author_id()
    }

    fn like_count(&self) -> u64 {
        (**self).like_count()
    }

    fn comment_count(&self) -> u64 {
        (**self).comment_count()
    }
}

fn non_blank(value: &str) -> Option<&str> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Missing, negative and non-finite counts become zero; fractions truncate.
pub fn clamp_count(value: Option<f64>) -> u64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v.trunc() as u64,
        _ => 0,
    }
}

/// Aggregate posts into a leaderboard sorted by descending score.
///
/// Records without an author are skipped. Never fails.
pub fn aggregate<I>(posts: I) -> Vec<UserStats>
where
    I: IntoIterator,
    I::Item: Engagement,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut stats: Vec<UserStats> = Vec::new();
    let mut skipped = 0usize;

    for post in posts {
        let Some(author_id) = post.author_id() else {
            skipped += 1;
            continue;
        };

        let slot = match index.get(author_id) {
            Some(&slot) => slot,
            None => {
                index.insert(author_id.to_string(), stats.len());
                stats.push(UserStats::new(author_id));
                stats.len() - 1
            }
        };

        let entry = &mut stats[slot];
        entry.total_posts = entry.total_posts.saturating_add(1);
        entry.total_likes = entry.total_likes.saturating_add(post.like_count());
        entry.total_comments = entry.total_comments.saturating_add(post.comment_count());
        entry.score =
            UserStats::compute_score(entry.total_posts, entry.total_likes, entry.total_comments);
    }

    if skipped > 0 {
        debug!(skipped, "Skipped posts without an author while aggregating");
    }

    // sort_by is stable: equal scores keep first-seen order
    stats.sort_by(|a, b| b.score.cmp(&a.score));
    stats
}

/// A leaderboard row as presented to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
    pub rank: usize,
    pub label: String,
    #[serde(flatten)]
    pub stats: UserStats,
}

/// Attach 1-based ranks and anonymous labels to the top `limit` entries.
pub fn rank_leaderboard(stats: &[UserStats], limit: usize) -> Vec<RankedEntry> {
    stats
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, s)| RankedEntry {
            rank: i + 1,
            label: format!("Anonymous User #{}", i + 1),
            stats: s.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(author: Option<&str>, likes: f64, comments: f64) -> PostRecord {
        PostRecord {
            id: None,
            author_id: author.map(str::to_string),
            like_count: Some(likes),
            comment_count: Some(comments),
        }
    }

    #[test]
    fn empty_input_yields_empty_leaderboard() {
        let posts: Vec<PostRecord> = Vec::new();
        assert!(aggregate(&posts).is_empty());
    }

    #[test]
    fn aggregates_and_orders_by_score() {
        let posts = vec![
            record(Some("a"), 2.0, 1.0),
            record(Some("b"), 0.0, 0.0),
            record(Some("a"), 0.0, 3.0),
        ];

        let stats = aggregate(&posts);

        assert_eq!(
            stats,
            vec![
                UserStats {
                    author_id: "a".into(),
                    total_posts: 2,
                    total_likes: 2,
                    total_comments: 4,
                    score: 10,
                },
                UserStats {
                    author_id: "b".into(),
                    total_posts: 1,
                    total_likes: 0,
                    total_comments: 0,
                    score: 1,
                },
            ]
        );
    }

    #[test]
    fn missing_author_is_dropped() {
        let posts = vec![record(None, 5.0, 0.0)];
        assert!(aggregate(&posts).is_empty());
    }

    #[test]
    fn blank_author_is_dropped_without_aborting() {
        let posts = vec![record(Some("   "), 5.0, 0.0), record(Some("c"), 1.0, 0.0)];
        let stats = aggregate(&posts);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].author_id, "c");
        assert_eq!(stats[0].score, 3);
    }

    #[test]
    fn bad_counts_are_clamped_to_zero() {
        let posts = vec![
            record(Some("a"), -4.0, f64::NAN),
            PostRecord {
                id: None,
                author_id: Some("a".into()),
                like_count: None,
                comment_count: Some(f64::INFINITY),
            },
        ];

        let stats = aggregate(&posts);
        assert_eq!(stats[0].total_likes, 0);
        assert_eq!(stats[0].total_comments, 0);
        assert_eq!(stats[0].score, 2);
    }

    #[test]
    fn fractional_counts_truncate() {
        assert_eq!(clamp_count(Some(2.9)), 2);
        assert_eq!(clamp_count(Some(0.4)), 0);
    }

    #[test]
    fn ties_keep_first_encounter_order() {
        let posts = vec![
            record(Some("late"), 0.0, 0.0),
            record(Some("early"), 0.0, 0.0),
            record(Some("mid"), 0.0, 0.0),
        ];

        let order: Vec<_> = aggregate(&posts)
            .into_iter()
            .map(|s| s.author_id)
            .collect();
        assert_eq!(order, vec!["late", "early", "mid"]);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let posts = vec![
            record(Some("a"), 1.0, 1.0),
            record(Some("b"), 3.0, 0.0),
            record(Some("c"), 0.0, 2.0),
        ];
        assert_eq!(aggregate(&posts), aggregate(&posts));
    }

    #[test]
    fn total_posts_matches_input_length() {
        let posts: Vec<_> = (0..25)
            .map(|i| record(Some(["x", "y", "z"][i % 3]), i as f64, 1.0))
            .collect();

        let total: u64 = aggregate(&posts).iter().map(|s| s.total_posts).sum();
        assert_eq!(total, posts.len() as u64);
    }

    #[test]
    fn one_more_post_raises_score_by_its_weight() {
        let mut posts = vec![record(Some("a"), 2.0, 1.0), record(Some("b"), 9.0, 0.0)];
        let before = aggregate(&posts)
            .into_iter()
            .find(|s| s.author_id == "a")
            .unwrap()
            .score;

        posts.push(record(Some("a"), 4.0, 3.0));
        let after = aggregate(&posts)
            .into_iter()
            .find(|s| s.author_id == "a")
            .unwrap()
            .score;

        assert_eq!(after - before, 1 + 2 * 4 + 3);
    }

    #[test]
    fn rank_leaderboard_labels_and_truncates() {
        let posts = vec![
            record(Some("a"), 5.0, 0.0),
            record(Some("b"), 1.0, 0.0),
            record(Some("c"), 0.0, 0.0),
        ];
        let ranked = rank_leaderboard(&aggregate(&posts), 2);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[0].label, "Anonymous User #1");
        assert_eq!(ranked[1].stats.author_id, "b");
    }
}
