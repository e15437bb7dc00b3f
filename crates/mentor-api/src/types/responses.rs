//! Response DTOs. Every success body carries `"success": true`.

use mentor_llm::{ChatReply, ProviderStatus};
use mentor_models::{AnalysisResult, CodeReview, SessionClaims, UserProfile};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SetupCheckResponse {
    #[serde(flatten)]
    pub providers: ProviderStatus,
    /// Whether signup codes are delivered by a real mail relay.
    pub mailer: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeScreenResponse {
    pub success: bool,
    pub analysis: AnalysisResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub success: bool,
    #[serde(flatten)]
    pub reply: ChatReply,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewCodeResponse {
    pub success: bool,
    pub review: CodeReview,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    pub success: bool,
    pub user: SessionClaims,
}
