/// Leaderboard handler
use crate::services::WallService;
use crate::session::Session;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
}

/// GET /api/v1/leaderboard
pub async fn get_leaderboard(
    wall: web::Data<WallService>,
    _session: Session,
    query: web::Query<LeaderboardQuery>,
) -> HttpResponse {
    HttpResponse::Ok().json(wall.leaderboard(query.limit).await)
}
