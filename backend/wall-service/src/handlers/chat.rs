/// WhisperBot handlers
use crate::error::{AppError, Result};
use crate::services::ChatClient;
use crate::session::Session;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

const MAX_PROMPT_CHARS: usize = 1000;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct SuggestRequest {
    pub topic: String,
}

fn prompt_text<'a>(field: &str, raw: &'a str) -> Result<&'a str> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty", field)));
    }
    if text.chars().count() > MAX_PROMPT_CHARS {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            field, MAX_PROMPT_CHARS
        )));
    }
    Ok(text)
}

/// POST /api/v1/chat
pub async fn chat(
    client: web::Data<ChatClient>,
    session: Session,
    req: web::Json<ChatRequest>,
) -> Result<HttpResponse> {
    let message = prompt_text("message", &req.message)?;
    tracing::debug!(user_id = %session.user_id, "WhisperBot chat request");

    let reply = client.reply_or_fallback(message).await;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "reply": reply })))
}

/// POST /api/v1/suggestions
pub async fn suggest(
    client: web::Data<ChatClient>,
    session: Session,
    req: web::Json<SuggestRequest>,
) -> Result<HttpResponse> {
    let topic = prompt_text("topic", &req.topic)?;
    tracing::debug!(user_id = %session.user_id, "Post suggestion request");

    let suggestion = client.suggest_or_fallback(topic).await;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "suggestion": suggestion })))
}
