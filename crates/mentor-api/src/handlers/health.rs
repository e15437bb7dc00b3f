//! Health and setup check handlers.

use axum::{extract::State, Json};

use crate::state::AppState;
use crate::types::{HealthResponse, SetupCheckResponse};

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.config.uptime_seconds(),
    })
}

/// GET /api/setup-check - which providers have keys. Makes no network calls.
pub async fn setup_check(State(state): State<AppState>) -> Json<SetupCheckResponse> {
    Json(SetupCheckResponse {
        providers: state.providers,
        mailer: state.mailer.delivers_externally(),
    })
}
