//! Signup, login and session handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use tracing::{debug, info};

use crate::auth::bearer_token;
use crate::error::{ApiError, Result, EMAIL_TAKEN};
use crate::handlers::json_body;
use crate::state::AppState;
use crate::types::{
    present, AuthResponse, LoginRequest, MeResponse, MessageResponse, SignupRequest,
    VerifyOtpRequest,
};

/// POST /api/auth/signup - sends a one-time code to a new address.
pub async fn signup(
    State(state): State<AppState>,
    body: std::result::Result<Json<SignupRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let req = json_body(body)?;
    let email = present(&req.email)
        .filter(|email| email.contains('@'))
        .ok_or_else(|| ApiError::BadRequest("Valid email is required".to_string()))?;

    if state.users.exists(email)? {
        return Err(ApiError::BadRequest(EMAIL_TAKEN.to_string()));
    }

    let otp = state.otps.issue(email);
    state.mailer.send_otp(email.trim(), &otp).await?;
    debug!("Signup code issued");

    Ok(Json(MessageResponse {
        success: true,
        message: "OTP sent to your email. Please verify.".to_string(),
    }))
}

/// POST /api/auth/verify-otp - consumes the code and creates the account.
pub async fn verify_otp(
    State(state): State<AppState>,
    body: std::result::Result<Json<VerifyOtpRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>> {
    let req = json_body(body)?;
    let (Some(email), Some(otp), Some(password)) =
        (present(&req.email), present(&req.otp), present(&req.password))
    else {
        return Err(ApiError::InputMissing(
            "Email, OTP, and password are required".to_string(),
        ));
    };

    if !state.otps.verify(email, otp) {
        return Err(ApiError::BadRequest(
            "Invalid or expired OTP. Please request a new one.".to_string(),
        ));
    }

    let user = state.users.create_user(email, password, req.name.as_deref())?;
    let token = state.tokens.issue(&user);
    info!(user_id = %user.id, "Signup verified");

    Ok(Json(AuthResponse {
        success: true,
        message: Some("Account created successfully!".to_string()),
        token,
        user,
    }))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    body: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>> {
    let req = json_body(body)?;
    let (Some(email), Some(password)) = (present(&req.email), present(&req.password)) else {
        return Err(ApiError::InputMissing(
            "Email and password are required".to_string(),
        ));
    };

    let user = state
        .users
        .verify_credentials(email, password)?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;
    let token = state.tokens.issue(&user);
    info!(user_id = %user.id, "Login");

    Ok(Json(AuthResponse {
        success: true,
        message: None,
        token,
        user,
    }))
}

/// GET /api/auth/me - resolves the bearer token.
pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<MeResponse>> {
    let token = bearer_token(&headers)
        .ok_or_else(|| ApiError::Unauthorized("No token provided".to_string()))?;
    let claims = state
        .tokens
        .resolve(token)
        .ok_or_else(|| ApiError::Unauthorized("Invalid token".to_string()))?;

    Ok(Json(MeResponse {
        success: true,
        user: claims,
    }))
}
