//! Transport to the HackMentor API.

use async_trait::async_trait;
use mentor_models::{AnalysisResult, ChatTurn, Role, SessionClaims, UserProfile};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, trace};

use crate::error::{Result, RuntimeError};

/// A prior chat turn sent as context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

impl From<&ChatTurn> for HistoryEntry {
    fn from(turn: &ChatTurn) -> Self {
        Self {
            role: turn.role,
            content: turn.content.clone(),
        }
    }
}

/// Body of `POST /api/analyze-screen`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzeEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub analysis: Option<AnalysisResult>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default, rename = "isCodeReview")]
    pub is_code_review: bool,
    #[serde(default)]
    pub issues: Option<usize>,
    #[serde(default)]
    pub error: Option<String>,
}

/// What the dashboard needs from the server.
#[async_trait]
pub trait MentorBackend: Send + Sync {
    async fn analyze_screen(&self, jpeg_b64: &str) -> Result<AnalyzeEnvelope>;

    async fn chat(&self, message: &str, history: &[HistoryEntry]) -> Result<ChatEnvelope>;
}

/// A signed-in session.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub token: String,
    pub user: UserProfile,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthReply {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    user: Option<UserProfile>,
}

#[derive(Debug, Deserialize)]
struct MessageReply {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MeReply {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    user: Option<SessionClaims>,
}

fn remote_error(error: Option<String>) -> RuntimeError {
    RuntimeError::Remote(error.unwrap_or_else(|| "Request failed".to_string()))
}

impl AuthReply {
    fn into_session(self) -> Result<AuthSession> {
        match (self.success, self.token, self.user) {
            (true, Some(token), Some(user)) => Ok(AuthSession {
                token,
                user,
                message: self.message,
            }),
            _ => Err(remote_error(self.error)),
        }
    }
}

/// HTTP client for the HackMentor API.
///
/// Error envelopes are returned as-is for analysis and chat so the
/// dashboard can decide how to degrade; auth calls turn them into
/// `RuntimeError::Remote`.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Sends `token` as a bearer credential on every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn read<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        trace!(status = status.as_u16(), "Backend replied");
        response
            .json::<T>()
            .await
            .map_err(|e| RuntimeError::Transport(format!("unreadable reply ({}): {}", status, e)))
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        debug!(path, "POST");
        let response = self
            .authorize(self.client.post(self.url(path)))
            .json(body)
            .send()
            .await
            .map_err(|e| RuntimeError::Transport(e.to_string()))?;
        Self::read(response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!(path, "GET");
        let response = self
            .authorize(self.client.get(self.url(path)))
            .send()
            .await
            .map_err(|e| RuntimeError::Transport(e.to_string()))?;
        Self::read(response).await
    }

    /// Requests a signup code for `email`. Returns the server's message.
    pub async fn signup(&self, email: &str, name: Option<&str>) -> Result<String> {
        let reply: MessageReply = self
            .post("/api/auth/signup", &json!({ "email": email, "name": name }))
            .await?;
        if !reply.success {
            return Err(remote_error(reply.error));
        }
        Ok(reply.message.unwrap_or_default())
    }

    pub async fn verify_otp(
        &self,
        email: &str,
        otp: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<AuthSession> {
        let reply: AuthReply = self
            .post(
                "/api/auth/verify-otp",
                &json!({ "email": email, "otp": otp, "password": password, "name": name }),
            )
            .await?;
        reply.into_session()
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession> {
        let reply: AuthReply = self
            .post("/api/auth/login", &json!({ "email": email, "password": password }))
            .await?;
        reply.into_session()
    }

    /// Resolves the configured token to its account.
    pub async fn me(&self) -> Result<SessionClaims> {
        let reply: MeReply = self.get("/api/auth/me").await?;
        match (reply.success, reply.user) {
            (true, Some(user)) => Ok(user),
            _ => Err(remote_error(reply.error)),
        }
    }
}

#[async_trait]
impl MentorBackend for HttpBackend {
    async fn analyze_screen(&self, jpeg_b64: &str) -> Result<AnalyzeEnvelope> {
        self.post("/api/analyze-screen", &json!({ "imageData": jpeg_b64 }))
            .await
    }

    async fn chat(&self, message: &str, history: &[HistoryEntry]) -> Result<ChatEnvelope> {
        self.post("/api/chat", &json!({ "message": message, "history": history }))
            .await
    }
}
