/// Change feed and wall projection
///
/// A `PostStore` publishes an immutable `PostSnapshot` after every change.
/// Consumers hold a `SnapshotFeed` and fold each snapshot into `WallState`
/// through the pure reducer in `reducer`.
pub mod projection;
pub mod reducer;

pub use projection::WallProjection;
pub use reducer::{reduce, PendingLike, WallAction, WallState};

use crate::models::Post;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;

/// Complete, point-in-time view of every post, newest first
#[derive(Debug, Clone, PartialEq)]
pub struct PostSnapshot {
    /// Strictly increases with every published change
    pub version: u64,
    pub taken_at: DateTime<Utc>,
    pub posts: Vec<Post>,
}

impl PostSnapshot {
    pub fn empty() -> Self {
        Self {
            version: 0,
            taken_at: Utc::now(),
            posts: Vec::new(),
        }
    }
}

/// Live subscription to a store's snapshots.
///
/// Always yields the most recent snapshot; snapshots published while the
/// consumer was busy are coalesced.
pub struct SnapshotFeed {
    rx: watch::Receiver<Arc<PostSnapshot>>,
    primed: bool,
}

impl SnapshotFeed {
    pub fn new(rx: watch::Receiver<Arc<PostSnapshot>>) -> Self {
        Self { rx, primed: false }
    }

    /// Wait for the next snapshot. The first call returns the current one
    /// immediately. Returns `None` once the publishing store is gone.
    pub async fn next(&mut self) -> Option<Arc<PostSnapshot>> {
        if !self.primed {
            self.primed = true;
            return Some(self.rx.borrow_and_update().clone());
        }

        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_next_returns_current_snapshot() {
        let (_tx, rx) = watch::channel(Arc::new(PostSnapshot::empty()));
        let mut feed = SnapshotFeed::new(rx);

        let snapshot = feed.next().await.expect("current snapshot");
        assert_eq!(snapshot.version, 0);
    }

    #[tokio::test]
    async fn intermediate_snapshots_are_coalesced() {
        let (tx, rx) = watch::channel(Arc::new(PostSnapshot::empty()));
        let mut feed = SnapshotFeed::new(rx);
        feed.next().await;

        for version in 1..=3 {
            tx.send_replace(Arc::new(PostSnapshot {
                version,
                ..PostSnapshot::empty()
            }));
        }

        assert_eq!(feed.next().await.map(|s| s.version), Some(3));
    }

    #[tokio::test]
    async fn feed_ends_when_publisher_drops() {
        let (tx, rx) = watch::channel(Arc::new(PostSnapshot::empty()));
        let mut feed = SnapshotFeed::new(rx);
        feed.next().await;

        drop(tx);
        assert!(feed.next().await.is_none());
    }
}
