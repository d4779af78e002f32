/// Wall business logic: posts, likes and comments
///
/// Every write goes straight to the `PostStore`; the snapshot a write produces
/// is folded into the projection before returning so callers read their own
/// writes. Like writes are bracketed by optimistic intents on the projection.
use crate::config::WallConfig;
use crate::error::{AppError, Result};
use crate::feed::{WallAction, WallProjection};
use crate::metrics::wall::{COMMENTS_ADDED_TOTAL, LIKE_MUTATIONS_TOTAL, POSTS_CREATED_TOTAL};
use crate::models::{
    Comment, FeedPost, LikeState, NewComment, NewPost, MAX_COMMENT_CHARS, MAX_POST_CHARS,
};
use crate::services::leaderboard::{rank_leaderboard, RankedEntry};
use crate::session::Session;
use crate::store::{Committed, PostStore};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

const DEFAULT_PAGE_LIMIT: usize = 20;
const POST_MAX_LEN: u64 = MAX_POST_CHARS as u64;
const COMMENT_MAX_LEN: u64 = MAX_COMMENT_CHARS as u64;
const IMAGE_URL_MAX_LEN: u64 = 2048;

#[derive(Debug, Validate)]
struct PostInput {
    #[validate(length(min = 1, max = POST_MAX_LEN))]
    content: String,
    #[validate(url, length(max = IMAGE_URL_MAX_LEN))]
    image_url: Option<String>,
}

#[derive(Debug, Validate)]
struct CommentInput {
    #[validate(length(min = 1, max = COMMENT_MAX_LEN))]
    content: String,
}

/// Ranked authors and the snapshot version they were computed from
#[derive(Debug, Serialize)]
pub struct Leaderboard {
    pub version: u64,
    pub entries: Vec<RankedEntry>,
}

/// One page of the wall feed
#[derive(Debug, Serialize)]
pub struct FeedPage {
    pub posts: Vec<FeedPost>,
    pub total_count: usize,
    pub has_more: bool,
}

#[derive(Clone)]
pub struct WallService {
    store: Arc<dyn PostStore>,
    projection: Arc<WallProjection>,
    limits: WallConfig,
}

impl WallService {
    pub fn new(store: Arc<dyn PostStore>, projection: Arc<WallProjection>, limits: WallConfig) -> Self {
        Self {
            store,
            projection,
            limits,
        }
    }

    pub fn projection(&self) -> &Arc<WallProjection> {
        &self.projection
    }

    async fn fold<T>(&self, committed: Committed<T>) -> T {
        self.projection
            .dispatch(WallAction::SnapshotReceived(committed.snapshot))
            .await;
        committed.value
    }

    pub async fn create_post(
        &self,
        session: &Session,
        content: &str,
        image_url: Option<&str>,
    ) -> Result<FeedPost> {
        let input = PostInput {
            content: content.trim().to_string(),
            image_url: image_url
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(str::to_string),
        };
        input.validate()?;
        if let Some(url) = &input.image_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(AppError::Validation(
                    "image_url must use http or https".to_string(),
                ));
            }
        }

        let committed = self
            .store
            .create_post(NewPost {
                author_id: session.user_id.clone(),
                author_label: session.display_name.clone(),
                content: input.content,
                image_url: input.image_url,
            })
            .await?;
        let post = self.fold(committed).await;

        POSTS_CREATED_TOTAL.inc();
        tracing::info!(post_id = %post.id, user_id = %session.user_id, "Post created");

        Ok(FeedPost {
            post,
            liked_by_me: false,
        })
    }

    pub async fn post(&self, session: &Session, post_id: Uuid) -> Result<FeedPost> {
        let post = self
            .store
            .post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;
        let liked_by_me = post.is_liked_by(&session.user_id);

        Ok(FeedPost { post, liked_by_me })
    }

    /// Newest-first feed page as seen by `session`
    pub async fn feed(
        &self,
        session: &Session,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<FeedPage> {
        let limit = limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, self.limits.feed_page_limit_max.max(1));
        let offset = offset.unwrap_or(0);

        let state = self.projection.state().await;
        let all = state.feed_for(&session.user_id);
        let total_count = all.len();
        let posts: Vec<FeedPost> = all.into_iter().skip(offset).take(limit).collect();
        let has_more = offset.saturating_add(posts.len()) < total_count;

        Ok(FeedPage {
            posts,
            total_count,
            has_more,
        })
    }

    /// Like (`liked = true`) or unlike a post; repeating a call is a no-op
    pub async fn set_like(&self, session: &Session, post_id: Uuid, liked: bool) -> Result<LikeState> {
        let intent = Uuid::new_v4();
        self.projection
            .dispatch(WallAction::LikeRequested {
                post_id,
                user_id: session.user_id.clone(),
                liked,
                intent,
            })
            .await;

        let result = self.store.set_like(post_id, &session.user_id, liked).await;
        self.settle_like(session, post_id, intent, result).await
    }

    /// Flip the caller's like. The optimistic direction is read from the
    /// projection and may lag the store; the store's flip is authoritative and
    /// the folded snapshot corrects the overlay.
    pub async fn toggle_like(&self, session: &Session, post_id: Uuid) -> Result<LikeState> {
        let intent = Uuid::new_v4();
        let state = self.projection.state().await;
        if let Some(post) = state.snapshot.posts.iter().find(|p| p.id == post_id) {
            self.projection
                .dispatch(WallAction::LikeRequested {
                    post_id,
                    user_id: session.user_id.clone(),
                    liked: !post.is_liked_by(&session.user_id),
                    intent,
                })
                .await;
        }

        let result = self.store.toggle_like(post_id, &session.user_id).await;
        self.settle_like(session, post_id, intent, result).await
    }

    async fn settle_like(
        &self,
        session: &Session,
        post_id: Uuid,
        intent: Uuid,
        result: crate::store::StoreResult<Committed<LikeState>>,
    ) -> Result<LikeState> {
        let outcome = match result {
            Ok(committed) => Ok(self.fold(committed).await),
            Err(e) => {
                tracing::warn!(%post_id, user_id = %session.user_id, error = %e, "Like write failed");
                Err(AppError::from(e))
            }
        };

        self.projection
            .dispatch(WallAction::LikeSettled {
                post_id,
                user_id: session.user_id.clone(),
                intent,
            })
            .await;

        let state = outcome?;
        let action = match (state.changed, state.liked) {
            (false, _) => "noop",
            (true, true) => "like",
            (true, false) => "unlike",
        };
        LIKE_MUTATIONS_TOTAL.with_label_values(&[action]).inc();
        tracing::debug!(%post_id, user_id = %session.user_id, action, like_count = state.like_count, "Like settled");

        Ok(state)
    }

    pub async fn add_comment(&self, session: &Session, post_id: Uuid, content: &str) -> Result<Comment> {
        let input = CommentInput {
            content: content.trim().to_string(),
        };
        input.validate()?;

        let committed = self
            .store
            .add_comment(NewComment {
                post_id,
                author_id: session.user_id.clone(),
                author_label: session.display_name.clone(),
                content: input.content,
            })
            .await?;
        let comment = self.fold(committed).await;

        COMMENTS_ADDED_TOTAL.inc();
        tracing::info!(%post_id, comment_id = %comment.id, user_id = %session.user_id, "Comment added");

        Ok(comment)
    }

    pub async fn comments(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        Ok(self.store.comments(post_id).await?)
    }

    /// Top `limit` authors by engagement score
    pub async fn leaderboard(&self, limit: Option<usize>) -> Leaderboard {
        let max = self.limits.leaderboard_limit_max.max(1);
        let limit = limit.unwrap_or(max).clamp(1, max);
        let state = self.projection.state().await;

        Leaderboard {
            version: state.version(),
            entries: rank_leaderboard(&state.leaderboard, limit),
        }
    }
}
