/// HTTP handlers for wall endpoints
///
/// - Posts: feed, create, fetch, like/unlike
/// - Comments: list and append
/// - Leaderboard: ranked engagement view
/// - Chat: WhisperBot replies and post suggestions
/// - Health: liveness and readiness
pub mod chat;
pub mod comments;
pub mod health;
pub mod leaderboard;
pub mod posts;

pub use chat::{chat, suggest};
pub use comments::{create_comment, list_comments};
pub use health::{health_summary, liveness_check};
pub use leaderboard::get_leaderboard;
pub use posts::{create_post, get_post, like_post, list_posts, toggle_like, unlike_post};

use crate::error::AppError;
use actix_web::web;

/// Register every `/api/v1` route.
///
/// Malformed bodies, queries and path segments are answered with the JSON
/// error body like every other failure.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    );

    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_summary))
            .route("/health/live", web::get().to(liveness_check))
            .service(
                web::scope("/posts")
                    .route("", web::get().to(list_posts))
                    .route("", web::post().to(create_post))
                    .route("/{post_id}", web::get().to(get_post))
                    .route("/{post_id}/like/toggle", web::post().to(toggle_like))
                    .route("/{post_id}/like", web::put().to(like_post))
                    .route("/{post_id}/like", web::delete().to(unlike_post))
                    .route("/{post_id}/comments", web::get().to(list_comments))
                    .route("/{post_id}/comments", web::post().to(create_comment)),
            )
            .route("/leaderboard", web::get().to(get_leaderboard))
            .route("/chat", web::post().to(chat))
            .route("/suggestions", web::post().to(suggest)),
    );
}
