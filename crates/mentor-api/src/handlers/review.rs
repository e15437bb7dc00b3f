//! Direct code review handler.

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::error::{ApiError, Result};
use crate::handlers::json_body;
use crate::state::AppState;
use crate::types::{present, ReviewCodeRequest, ReviewCodeResponse};

/// POST /api/review-code
pub async fn review_code(
    State(state): State<AppState>,
    body: std::result::Result<Json<ReviewCodeRequest>, JsonRejection>,
) -> Result<Json<ReviewCodeResponse>> {
    let req = json_body(body)?;
    let code = present(&req.code)
        .ok_or_else(|| ApiError::InputMissing("No code provided".to_string()))?;
    let review = state.pipeline.review_code(code, req.language.as_deref()).await;
    Ok(Json(ReviewCodeResponse {
        success: true,
        review,
    }))
}
