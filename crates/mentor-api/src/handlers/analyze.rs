//! Screen analysis handler.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use tracing::debug;

use crate::error::{ApiError, Result};
use crate::handlers::json_body;
use crate::state::AppState;
use crate::types::{present, AnalyzeScreenRequest, AnalyzeScreenResponse};

/// Accepts raw base64 or a `data:image/jpeg;base64,` URL.
fn strip_data_url(image: &str) -> &str {
    match image.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => image,
    }
}

/// POST /api/analyze-screen
pub async fn analyze_screen(
    State(state): State<AppState>,
    body: std::result::Result<Json<AnalyzeScreenRequest>, JsonRejection>,
) -> Result<Json<AnalyzeScreenResponse>> {
    let req = json_body(body)?;
    let image = present(&req.image_data)
        .map(strip_data_url)
        .ok_or_else(|| ApiError::InputMissing("No image data provided".to_string()))?;

    debug!(bytes = image.len(), "Analysing screenshot");
    let analysis = state.pipeline.analyze_screen(image).await;

    Ok(Json(AnalyzeScreenResponse {
        success: true,
        analysis,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_data_url() {
        assert_eq!(strip_data_url("data:image/jpeg;base64,QUJD"), "QUJD");
        assert_eq!(strip_data_url("QUJD"), "QUJD");
    }
}
