/// Business logic layer
pub mod inference;
pub mod leaderboard;
pub mod wall;

pub use inference::{ChatClient, ChatError};
pub use leaderboard::{aggregate, rank_leaderboard, Engagement, RankedEntry};
pub use wall::{FeedPage, Leaderboard, WallService};
