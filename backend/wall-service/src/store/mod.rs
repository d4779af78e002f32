/// Post storage
///
/// `PostStore` is the seam between the wall and whatever document store holds
/// posts. Every successful mutation publishes a complete `PostSnapshot` to all
/// subscribers; the mutation result carries the snapshot it produced so the
/// writer can read its own write without waiting for the feed.
pub mod memory;

pub use memory::InMemoryPostStore;

use crate::error::StoreError;
use crate::feed::{PostSnapshot, SnapshotFeed};
use crate::models::{Comment, LikeState, NewComment, NewPost, Post};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result of a write together with the snapshot it produced
#[derive(Debug, Clone)]
pub struct Committed<T> {
    pub value: T,
    pub snapshot: Arc<PostSnapshot>,
}

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn create_post(&self, new_post: NewPost) -> StoreResult<Committed<Post>>;

    /// Idempotent: liking twice or unliking an unliked post changes nothing
    async fn set_like(
        &self,
        post_id: Uuid,
        user_id: &str,
        liked: bool,
    ) -> StoreResult<Committed<LikeState>>;

    /// Flip the user's like atomically
    async fn toggle_like(&self, post_id: Uuid, user_id: &str) -> StoreResult<Committed<LikeState>>;

    async fn add_comment(&self, new_comment: NewComment) -> StoreResult<Committed<Comment>>;

    /// Comments of a post, oldest first
    async fn comments(&self, post_id: Uuid) -> StoreResult<Vec<Comment>>;

    async fn post(&self, post_id: Uuid) -> StoreResult<Option<Post>>;

    async fn snapshot(&self) -> Arc<PostSnapshot>;

    fn subscribe(&self) -> SnapshotFeed;
}
