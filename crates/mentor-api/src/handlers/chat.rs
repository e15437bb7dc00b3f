//! Mentor chat handler.

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::error::{ApiError, Result};
use crate::handlers::json_body;
use crate::state::AppState;
use crate::types::{present, ChatRequest, ChatResponse};

/// POST /api/chat
pub async fn chat(
    State(state): State<AppState>,
    body: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>> {
    let req = json_body(body)?;
    let message = present(&req.message)
        .ok_or_else(|| ApiError::InputMissing("No message provided".to_string()))?;
    let reply = state.pipeline.chat(message, req.history()).await?;
    Ok(Json(ChatResponse {
        success: true,
        reply,
    }))
}
