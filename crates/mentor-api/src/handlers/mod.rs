//! API request handlers.

pub mod analyze;
pub mod auth;
pub mod chat;
pub mod health;
pub mod review;

pub use analyze::*;
pub use auth::*;
pub use chat::*;
pub use health::*;
pub use review::*;

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::{ApiError, Result};

/// Unwraps a JSON body, answering malformed bodies with the API envelope.
pub(crate) fn json_body<T>(body: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}
