use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_histogram_vec, register_int_counter, register_int_counter_vec,
    Histogram, HistogramVec, IntCounter, IntCounterVec,
};

lazy_static! {
    /// Posts accepted by the store.
    pub static ref POSTS_CREATED_TOTAL: IntCounter = register_int_counter!(
        "wall_posts_created_total",
        "Total posts created"
    )
    .expect("failed to register wall_posts_created_total");

    /// Like mutations segmented by action (like, unlike, noop).
    pub static ref LIKE_MUTATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "wall_like_mutations_total",
        "Like mutations segmented by resulting action",
        &["action"]
    )
    .expect("failed to register wall_like_mutations_total");

    /// Comments appended to posts.
    pub static ref COMMENTS_ADDED_TOTAL: IntCounter = register_int_counter!(
        "wall_comments_added_total",
        "Total comments added"
    )
    .expect("failed to register wall_comments_added_total");

    /// Snapshots folded into the projection (applied/stale).
    pub static ref SNAPSHOTS_APPLIED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "wall_snapshots_total",
        "Post snapshots received by the projection segmented by outcome",
        &["outcome"]
    )
    .expect("failed to register wall_snapshots_total");

    /// Time spent reducing a snapshot, leaderboard included.
    pub static ref LEADERBOARD_RECOMPUTE_SECONDS: Histogram = register_histogram!(
        "wall_leaderboard_recompute_seconds",
        "Duration of folding a snapshot and recomputing the leaderboard"
    )
    .expect("failed to register wall_leaderboard_recompute_seconds");

    /// Inference calls segmented by kind (chat, suggestion) and outcome.
    pub static ref INFERENCE_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "wall_inference_requests_total",
        "Inference requests segmented by kind and outcome",
        &["kind", "outcome"]
    )
    .expect("failed to register wall_inference_requests_total");

    pub static ref INFERENCE_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "wall_inference_request_duration_seconds",
        "Inference request latency segmented by kind",
        &["kind"]
    )
    .expect("failed to register wall_inference_request_duration_seconds");
}
