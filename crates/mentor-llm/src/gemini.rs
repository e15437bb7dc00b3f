//! Google Gemini `generateContent` client.

use serde_json::{json, Value};
use tracing::{debug, trace};

use crate::error::{ModelError, Result};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", GEMINI_API_BASE, self.model)
    }

    /// Sends a prompt, optionally with an inline JPEG, and returns the
    /// concatenated text of the first candidate.
    pub async fn generate(&self, prompt: &str, jpeg_b64: Option<&str>) -> Result<String> {
        let body = request_body(prompt, jpeg_b64);
        trace!(model = %self.model, "Sending Gemini request");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::Request(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status {
                provider: "gemini".to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| ModelError::Parse(format!("Failed to parse response: {}", e)))?;
        let text = candidate_text(&value)
            .ok_or_else(|| ModelError::Parse("Gemini response had no text candidate".to_string()))?;

        debug!(model = %self.model, chars = text.len(), "Gemini response received");
        Ok(text)
    }
}

fn request_body(prompt: &str, jpeg_b64: Option<&str>) -> Value {
    let mut parts = vec![json!({ "text": prompt })];
    if let Some(data) = jpeg_b64 {
        parts.push(json!({
            "inline_data": { "mime_type": "image/jpeg", "data": data }
        }));
    }
    json!({ "contents": [{ "parts": parts }] })
}

fn candidate_text(value: &Value) -> Option<String> {
    let parts = value["candidates"][0]["content"]["parts"].as_array()?;
    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_with_image() {
        let body = request_body("extract", Some("QUJD"));
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "extract");
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/jpeg");
        assert_eq!(parts[1]["inline_data"]["data"], "QUJD");
    }

    #[test]
    fn test_request_body_text_only() {
        let body = request_body("hello", None);
        assert_eq!(body["contents"][0]["parts"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_candidate_text_joins_parts() {
        let value = json!({
            "candidates": [{"content": {"parts": [{"text": "{\"has_code\": "}, {"text": "false}"}]}}]
        });
        assert_eq!(candidate_text(&value).as_deref(), Some("{\"has_code\": false}"));
        assert_eq!(candidate_text(&json!({"candidates": []})), None);
    }

    #[test]
    fn test_endpoint_includes_model() {
        let client = GeminiClient::new("k", "gemini-2.5-flash");
        assert!(client.endpoint().ends_with("/models/gemini-2.5-flash:generateContent"));
    }
}
