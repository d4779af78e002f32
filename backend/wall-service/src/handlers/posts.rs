/// Post handlers - HTTP endpoints for post and like operations
use crate::error::Result;
use crate::services::WallService;
use crate::session::Session;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub content: String,
    pub image_url: Option<String>,
}

/// Pagination query parameters
#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// GET /api/v1/posts
pub async fn list_posts(
    wall: web::Data<WallService>,
    session: Session,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse> {
    let page = wall.feed(&session, query.limit, query.offset).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// POST /api/v1/posts
pub async fn create_post(
    wall: web::Data<WallService>,
    session: Session,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    let post = wall
        .create_post(&session, &req.content, req.image_url.as_deref())
        .await?;

    Ok(HttpResponse::Created().json(post))
}

/// GET /api/v1/posts/{post_id}
pub async fn get_post(
    wall: web::Data<WallService>,
    session: Session,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post = wall.post(&session, *post_id).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// POST /api/v1/posts/{post_id}/like/toggle
pub async fn toggle_like(
    wall: web::Data<WallService>,
    session: Session,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let state = wall.toggle_like(&session, *post_id).await?;
    Ok(HttpResponse::Ok().json(state))
}

/// PUT /api/v1/posts/{post_id}/like
pub async fn like_post(
    wall: web::Data<WallService>,
    session: Session,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let state = wall.set_like(&session, *post_id, true).await?;
    Ok(HttpResponse::Ok().json(state))
}

/// DELETE /api/v1/posts/{post_id}/like
pub async fn unlike_post(
    wall: web::Data<WallService>,
    session: Session,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let state = wall.set_like(&session, *post_id, false).await?;
    Ok(HttpResponse::Ok().json(state))
}
