//! Request DTOs.
//!
//! Required fields are optional here so handlers can answer a missing
//! field with the API's own error message instead of a body rejection.

use mentor_llm::HistoryMessage;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzeScreenRequest {
    #[serde(rename = "imageData", default)]
    pub image_data: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    /// Prior turns; absent and `null` both mean none.
    #[serde(default)]
    pub history: Option<Vec<HistoryMessage>>,
}

impl ChatRequest {
    pub fn history(&self) -> &[HistoryMessage] {
        self.history.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewCodeRequest {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyOtpRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub otp: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Treats empty and whitespace-only strings as absent.
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_request_wire_name() {
        let req: AnalyzeScreenRequest = serde_json::from_str(r#"{"imageData":"QUJD"}"#).unwrap();
        assert_eq!(req.image_data.as_deref(), Some("QUJD"));
        let empty: AnalyzeScreenRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.image_data.is_none());
    }

    #[test]
    fn test_chat_history_ignores_extra_fields() {
        let req: ChatRequest = serde_json::from_str(
            r#"{"message":"hi","history":[{"id":"turn-1","role":"user","content":"a",
                "timestamp":"2024-01-01T00:00:00Z"}]}"#,
        )
        .unwrap();
        assert_eq!(req.history().len(), 1);
        assert_eq!(req.history()[0].content, "a");
    }

    #[test]
    fn test_chat_history_null_or_missing_is_empty() {
        let null: ChatRequest = serde_json::from_str(r#"{"message":"hi","history":null}"#).unwrap();
        assert!(null.history().is_empty());
        let missing: ChatRequest = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert!(missing.history().is_empty());
    }

    #[test]
    fn test_present() {
        assert_eq!(present(&Some("  ".into())), None);
        assert_eq!(present(&None), None);
        assert_eq!(present(&Some("x".into())), Some("x"));
    }
}
