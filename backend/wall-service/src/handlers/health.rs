/// Health endpoints
use crate::services::WallService;
use actix_web::{web, HttpResponse};

/// Ready once the projection has applied its first snapshot
pub async fn health_summary(wall: web::Data<WallService>) -> HttpResponse {
    let state = wall.projection().state().await;

    if state.loading {
        return HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "starting",
            "service": "wall-service",
            "version": env!("CARGO_PKG_VERSION"),
        }));
    }

    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "wall-service",
        "version": env!("CARGO_PKG_VERSION"),
        "snapshot_version": state.version(),
        "posts": state.snapshot.posts.len(),
    }))
}

pub async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}
