/// In-process `PostStore`
///
/// One async RwLock guards posts, likers and comments so that a mutation and
/// the snapshot it publishes are always consistent. Like and comment counts are
/// derived from the stored likers and comments when a snapshot is built.
use super::{Committed, PostStore, StoreResult};
use crate::error::StoreError;
use crate::feed::{PostSnapshot, SnapshotFeed};
use crate::models::{Comment, LikeState, NewComment, NewPost, Post};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::debug;
use uuid::Uuid;

struct StoredPost {
    id: Uuid,
    author_id: String,
    author_label: String,
    content: String,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    liked_by: BTreeSet<String>,
}

#[derive(Default)]
struct Inner {
    version: u64,
    /// Insertion order, oldest first
    posts: Vec<StoredPost>,
    index: HashMap<Uuid, usize>,
    comments: HashMap<Uuid, Vec<Comment>>,
}

impl Inner {
    fn slot(&self, post_id: Uuid) -> StoreResult<usize> {
        self.index
            .get(&post_id)
            .copied()
            .ok_or(StoreError::PostNotFound(post_id))
    }

    fn view(&self, stored: &StoredPost) -> Post {
        Post {
            id: stored.id,
            author_id: stored.author_id.clone(),
            author_label: stored.author_label.clone(),
            content: stored.content.clone(),
            image_url: stored.image_url.clone(),
            created_at: stored.created_at,
            liked_by: stored.liked_by.clone(),
            like_count: stored.liked_by.len() as u64,
            comment_count: self.comments.get(&stored.id).map_or(0, |c| c.len() as u64),
        }
    }

    fn build_snapshot(&self) -> PostSnapshot {
        PostSnapshot {
            version: self.version,
            taken_at: Utc::now(),
            posts: self.posts.iter().rev().map(|p| self.view(p)).collect(),
        }
    }
}

pub struct InMemoryPostStore {
    inner: RwLock<Inner>,
    tx: watch::Sender<Arc<PostSnapshot>>,
}

impl Default for InMemoryPostStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::new(PostSnapshot::empty()));
        Self {
            inner: RwLock::new(Inner::default()),
            tx,
        }
    }

    /// Bump the version and push a fresh snapshot to subscribers.
    /// Must be called with the write lock held.
    fn publish(&self, inner: &mut Inner) -> Arc<PostSnapshot> {
        inner.version += 1;
        let snapshot = Arc::new(inner.build_snapshot());
        self.tx.send_replace(snapshot.clone());
        debug!(
            version = snapshot.version,
            posts = snapshot.posts.len(),
            "Published post snapshot"
        );
        snapshot
    }

    fn apply_like(
        &self,
        inner: &mut Inner,
        post_id: Uuid,
        user_id: &str,
        liked: bool,
    ) -> StoreResult<Committed<LikeState>> {
        let slot = inner.slot(post_id)?;
        let likers = &mut inner.posts[slot].liked_by;
        let changed = if liked {
            likers.insert(user_id.to_string())
        } else {
            likers.remove(user_id)
        };
        let like_count = likers.len() as u64;

        let snapshot = if changed {
            self.publish(inner)
        } else {
            self.tx.borrow().clone()
        };

        Ok(Committed {
            value: LikeState {
                post_id,
                liked,
                like_count,
                changed,
            },
            snapshot,
        })
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn create_post(&self, new_post: NewPost) -> StoreResult<Committed<Post>> {
        let mut inner = self.inner.write().await;

        let stored = StoredPost {
            id: Uuid::new_v4(),
            author_id: new_post.author_id,
            author_label: new_post.author_label,
            content: new_post.content,
            image_url: new_post.image_url,
            created_at: Utc::now(),
            liked_by: BTreeSet::new(),
        };
        let post = inner.view(&stored);

        let slot = inner.posts.len();
        inner.index.insert(stored.id, slot);
        inner.posts.push(stored);

        let snapshot = self.publish(&mut inner);
        Ok(Committed {
            value: post,
            snapshot,
        })
    }

    async fn set_like(
        &self,
        post_id: Uuid,
        user_id: &str,
        liked: bool,
    ) -> StoreResult<Committed<LikeState>> {
        let mut inner = self.inner.write().await;
        self.apply_like(&mut inner, post_id, user_id, liked)
    }

    async fn toggle_like(&self, post_id: Uuid, user_id: &str) -> StoreResult<Committed<LikeState>> {
        let mut inner = self.inner.write().await;
        let slot = inner.slot(post_id)?;
        let liked = !inner.posts[slot].liked_by.contains(user_id);
        self.apply_like(&mut inner, post_id, user_id, liked)
    }

    async fn add_comment(&self, new_comment: NewComment) -> StoreResult<Committed<Comment>> {
        let mut inner = self.inner.write().await;
        inner.slot(new_comment.post_id)?;

        let comment = Comment {
            id: Uuid::new_v4(),
            post_id: new_comment.post_id,
            author_id: new_comment.author_id,
            author_label: new_comment.author_label,
            content: new_comment.content,
            created_at: Utc::now(),
        };
        inner
            .comments
            .entry(comment.post_id)
            .or_default()
            .push(comment.clone());

        let snapshot = self.publish(&mut inner);
        Ok(Committed {
            value: comment,
            snapshot,
        })
    }

    async fn comments(&self, post_id: Uuid) -> StoreResult<Vec<Comment>> {
        let inner = self.inner.read().await;
        inner.slot(post_id)?;
        Ok(inner.comments.get(&post_id).cloned().unwrap_or_default())
    }

    async fn post(&self, post_id: Uuid) -> StoreResult<Option<Post>> {
        let inner = self.inner.read().await;
        Ok(inner
            .index
            .get(&post_id)
            .map(|&slot| inner.view(&inner.posts[slot])))
    }

    async fn snapshot(&self) -> Arc<PostSnapshot> {
        self.tx.borrow().clone()
    }

    fn subscribe(&self) -> SnapshotFeed {
        SnapshotFeed::new(self.tx.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_post(author: &str, content: &str) -> NewPost {
        NewPost {
            author_id: author.into(),
            author_label: "Whisperer".into(),
            content: content.into(),
            image_url: None,
        }
    }

    fn new_comment(post_id: Uuid, author: &str) -> NewComment {
        NewComment {
            post_id,
            author_id: author.into(),
            author_label: "Whisperer".into(),
            content: "nice".into(),
        }
    }

    #[tokio::test]
    async fn snapshots_are_newest_first_with_increasing_versions() {
        let store = InMemoryPostStore::new();
        let first = store.create_post(new_post("a", "one")).await.unwrap();
        let second = store.create_post(new_post("b", "two")).await.unwrap();

        assert!(second.snapshot.version > first.snapshot.version);
        let contents: Vec<_> = second
            .snapshot
            .posts
            .iter()
            .map(|p| p.content.as_str())
            .collect();
        assert_eq!(contents, vec!["two", "one"]);
    }

    #[tokio::test]
    async fn like_is_idempotent() {
        let store = InMemoryPostStore::new();
        let post = store.create_post(new_post("a", "hi")).await.unwrap().value;

        let first = store.set_like(post.id, "u", true).await.unwrap();
        let second = store.set_like(post.id, "u", true).await.unwrap();

        assert!(first.value.changed);
        assert!(!second.value.changed);
        assert_eq!(second.value.like_count, 1);
        assert_eq!(second.snapshot.version, first.snapshot.version);
    }

    #[tokio::test]
    async fn unlike_without_like_is_a_noop() {
        let store = InMemoryPostStore::new();
        let post = store.create_post(new_post("a", "hi")).await.unwrap().value;

        let state = store.set_like(post.id, "u", false).await.unwrap().value;
        assert!(!state.changed);
        assert_eq!(state.like_count, 0);
    }

    #[tokio::test]
    async fn toggle_flips_like_state() {
        let store = InMemoryPostStore::new();
        let post = store.create_post(new_post("a", "hi")).await.unwrap().value;

        assert!(store.toggle_like(post.id, "u").await.unwrap().value.liked);
        let off = store.toggle_like(post.id, "u").await.unwrap();
        assert!(!off.value.liked);
        assert_eq!(off.snapshot.posts[0].like_count, 0);
    }

    #[tokio::test]
    async fn comment_count_tracks_stored_comments() {
        let store = InMemoryPostStore::new();
        let post = store.create_post(new_post("a", "hi")).await.unwrap().value;

        store.add_comment(new_comment(post.id, "b")).await.unwrap();
        let committed = store.add_comment(new_comment(post.id, "c")).await.unwrap();

        let comments = store.comments(post.id).await.unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].author_id, "b");
        assert_eq!(committed.snapshot.posts[0].comment_count, 2);
    }

    #[tokio::test]
    async fn unknown_post_is_reported() {
        let store = InMemoryPostStore::new();
        let missing = Uuid::new_v4();

        assert_eq!(
            store.add_comment(new_comment(missing, "b")).await.unwrap_err(),
            StoreError::PostNotFound(missing)
        );
        assert_eq!(
            store.toggle_like(missing, "u").await.unwrap_err(),
            StoreError::PostNotFound(missing)
        );
        assert!(store.post(missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn subscribers_receive_published_snapshots() {
        let store = InMemoryPostStore::new();
        let mut feed = store.subscribe();
        assert_eq!(feed.next().await.unwrap().version, 0);

        store.create_post(new_post("a", "hi")).await.unwrap();
        let snapshot = feed.next().await.unwrap();
        assert_eq!(snapshot.version, 1);
        assert_eq!(snapshot.posts.len(), 1);
    }
}
