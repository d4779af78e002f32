//! Pure wall-state reducer.
//!
//! `reduce` never performs I/O and never mutates its input: it returns a new
//! `WallState` for every action. Snapshots replace the confirmed posts and
//! recompute the leaderboard; like intents are kept as a per-user overlay until
//! a snapshot confirms them or the write settles.

use crate::feed::PostSnapshot;
use crate::models::{FeedPost, UserStats};
use crate::services::leaderboard;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub enum WallAction {
    /// A complete snapshot arrived from the store
    SnapshotReceived(Arc<PostSnapshot>),
    /// A user asked to like (`liked = true`) or unlike a post. `intent`
    /// identifies this request; a newer request for the same post and user
    /// replaces it.
    LikeRequested {
        post_id: Uuid,
        user_id: String,
        liked: bool,
        intent: Uuid,
    },
    /// The write for `intent` finished, successfully or not. Drops the
    /// optimistic state only if no newer request has replaced it.
    LikeSettled {
        post_id: Uuid,
        user_id: String,
        intent: Uuid,
    },
}

/// Optimistic like state awaiting confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingLike {
    pub liked: bool,
    pub intent: Uuid,
}

#[derive(Debug, Clone)]
pub struct WallState {
    /// True until the first snapshot has been applied
    pub loading: bool,
    pub snapshot: Arc<PostSnapshot>,
    pub leaderboard: Arc<Vec<UserStats>>,
    /// Desired like state per (post, user) not yet reflected in `snapshot`
    pub pending_likes: BTreeMap<(Uuid, String), PendingLike>,
}

impl Default for WallState {
    fn default() -> Self {
        Self {
            loading: true,
            snapshot: Arc::new(PostSnapshot::empty()),
            leaderboard: Arc::new(Vec::new()),
            pending_likes: BTreeMap::new(),
        }
    }
}

impl WallState {
    pub fn version(&self) -> u64 {
        self.snapshot.version
    }

    fn confirmed_like(&self, post_id: Uuid, user_id: &str) -> Option<bool> {
        self.snapshot
            .posts
            .iter()
            .find(|p| p.id == post_id)
            .map(|p| p.is_liked_by(user_id))
    }

    /// Posts as seen by `viewer`, with that viewer's pending likes applied.
    pub fn feed_for(&self, viewer: &str) -> Vec<FeedPost> {
        self.snapshot
            .posts
            .iter()
            .map(|post| {
                let confirmed = post.is_liked_by(viewer);
                let desired = self
                    .pending_likes
                    .get(&(post.id, viewer.to_string()))
                    .map_or(confirmed, |pending| pending.liked);

                let mut post = post.clone();
                match (confirmed, desired) {
                    (false, true) => post.like_count = post.like_count.saturating_add(1),
                    (true, false) => post.like_count = post.like_count.saturating_sub(1),
                    _ => {}
                }

                FeedPost {
                    post,
                    liked_by_me: desired,
                }
            })
            .collect()
    }
}

pub fn reduce(state: &WallState, action: WallAction) -> WallState {
    match action {
        WallAction::SnapshotReceived(snapshot) => {
            if !state.loading && snapshot.version <= state.version() {
                return state.clone();
            }

            let leaderboard = Arc::new(leaderboard::aggregate(snapshot.posts.iter()));
            let pending_likes = state
                .pending_likes
                .iter()
                .filter(|((post_id, user_id), desired)| {
                    snapshot
                        .posts
                        .iter()
                        .find(|p| p.id == *post_id)
                        .map(|p| p.is_liked_by(user_id) != desired.liked)
                        .unwrap_or(false)
                })
                .map(|(k, v)| (k.clone(), *v))
                .collect();

            WallState {
                loading: false,
                snapshot,
                leaderboard,
                pending_likes,
            }
        }
        WallAction::LikeRequested {
            post_id,
            user_id,
            liked,
            intent,
        } => {
            let mut next = state.clone();
            let key = (post_id, user_id);
            match state.confirmed_like(post_id, &key.1) {
                Some(confirmed) if confirmed != liked => {
                    next.pending_likes.insert(key, PendingLike { liked, intent });
                }
                _ => {
                    next.pending_likes.remove(&key);
                }
            }
            next
        }
        WallAction::LikeSettled {
            post_id,
            user_id,
            intent,
        } => {
            let key = (post_id, user_id);
            match state.pending_likes.get(&key) {
                Some(pending) if pending.intent == intent => {
                    let mut next = state.clone();
                    next.pending_likes.remove(&key);
                    next
                }
                _ => state.clone(),
            }
        }
    }
}
