/// Wall Service Library
///
/// Backend for the anonymous Whisper wall: posts, likes, comments, an
/// engagement leaderboard and the WhisperBot chat passthrough.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and route table
/// - `models`: posts, comments and derived user statistics
/// - `services`: wall operations, leaderboard aggregation, inference client
/// - `store`: post storage seam and in-process implementation
/// - `feed`: snapshot change feed, pure reducer and wall projection
/// - `session`: bearer-token sessions passed explicitly to operations
/// - `error`: error types and HTTP mapping
/// - `config`: configuration management
/// - `metrics`: Prometheus collectors
pub mod config;
pub mod error;
pub mod feed;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod session;
pub mod store;

pub use config::Config;
pub use error::{AppError, Result};
