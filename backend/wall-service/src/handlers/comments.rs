/// Comment handlers - HTTP endpoints for comment operations
use crate::error::Result;
use crate::services::WallService;
use crate::session::Session;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

/// Get comments for a post, oldest first
pub async fn list_comments(
    wall: web::Data<WallService>,
    _session: Session,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let comments = wall.comments(*post_id).await?;
    Ok(HttpResponse::Ok().json(comments))
}

/// Create a new comment
pub async fn create_comment(
    wall: web::Data<WallService>,
    session: Session,
    post_id: web::Path<Uuid>,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    let comment = wall.add_comment(&session, *post_id, &req.content).await?;
    Ok(HttpResponse::Created().json(comment))
}
