/// Wall projection - keeps the current `WallState` and folds actions into it
use crate::feed::{reduce, SnapshotFeed, WallAction, WallState};
use crate::metrics::wall::{LEADERBOARD_RECOMPUTE_SECONDS, SNAPSHOTS_APPLIED_TOTAL};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

pub struct WallProjection {
    state: RwLock<Arc<WallState>>,
}

impl Default for WallProjection {
    fn default() -> Self {
        Self::new()
    }
}

impl WallProjection {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(Arc::new(WallState::default())),
        }
    }

    /// Current state; cheap to clone and safe to hold across awaits
    pub async fn state(&self) -> Arc<WallState> {
        self.state.read().await.clone()
    }

    /// Fold one action into the state and return the result
    pub async fn dispatch(&self, action: WallAction) -> Arc<WallState> {
        let is_snapshot = matches!(action, WallAction::SnapshotReceived(_));
        let mut guard = self.state.write().await;
        let previous_version = guard.version();
        let was_loading = guard.loading;

        let timer = is_snapshot.then(|| LEADERBOARD_RECOMPUTE_SECONDS.start_timer());
        let next = Arc::new(reduce(&guard, action));
        drop(timer);

        if is_snapshot {
            if was_loading || next.version() > previous_version {
                SNAPSHOTS_APPLIED_TOTAL.with_label_values(&["applied"]).inc();
                debug!(
                    version = next.version(),
                    posts = next.snapshot.posts.len(),
                    authors = next.leaderboard.len(),
                    "Applied post snapshot"
                );
            } else {
                SNAPSHOTS_APPLIED_TOTAL.with_label_values(&["stale"]).inc();
            }
        }

        *guard = next.clone();
        next
    }

    /// Fold every snapshot from `feed` until the store goes away
    pub async fn run(&self, mut feed: SnapshotFeed) {
        while let Some(snapshot) = feed.next().await {
            self.dispatch(WallAction::SnapshotReceived(snapshot)).await;
        }
        info!("Snapshot feed closed; wall projection stopped");
    }

    pub fn spawn(self: &Arc<Self>, feed: SnapshotFeed) -> JoinHandle<()> {
        let projection = Arc::clone(self);
        tokio::spawn(async move { projection.run(feed).await })
    }
}
