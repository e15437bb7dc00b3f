//! Screenshot to code extraction.
//!
//! Providers are tried in order. When every provider fails, or none is
//! configured, the chain answers with a canned extraction that asks the
//! developer to paste code into the chat instead.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::client::{ChatCompletionsClient, ChatMessage};
use crate::config::ProviderConfig;
use crate::error::{ModelError, Result};
use crate::gemini::GeminiClient;
use crate::model::VISION_PARAMS;
use crate::parse::json_object_span;
use crate::prompts::EXTRACTION_PROMPT;

const UNAVAILABLE_CODE: &str = "// Vision AI temporarily unavailable\n// Please paste your code in the chat and ask for review\n// Example: \"Review this code: [paste your code here]\"";

/// What a vision model read off the screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeExtraction {
    #[serde(default)]
    pub has_code: bool,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
}

impl CodeExtraction {
    pub fn none() -> Self {
        Self::default()
    }

    /// Placeholder returned when no provider could read the image.
    pub fn unavailable() -> Self {
        Self {
            has_code: true,
            code: Some(UNAVAILABLE_CODE.to_string()),
            language: Some("javascript".to_string()),
            file_name: Some("code.js".to_string()),
        }
    }

    /// The extracted code, if the model reported any.
    pub fn code(&self) -> Option<&str> {
        if !self.has_code {
            return None;
        }
        self.code.as_deref().filter(|code| !code.is_empty())
    }

    /// Parses a model reply. Replies without a JSON object mean no code.
    pub fn from_reply(reply: &str) -> Result<Self> {
        match json_object_span(reply) {
            Some(json) => serde_json::from_str(json)
                .map_err(|e| ModelError::Parse(format!("invalid extraction JSON: {}", e))),
            None => Ok(Self::none()),
        }
    }
}

#[async_trait]
pub trait VisionExtractor: Send + Sync {
    fn name(&self) -> &str;

    async fn extract(&self, jpeg_b64: &str) -> Result<CodeExtraction>;
}

pub struct GeminiVision {
    client: GeminiClient,
}

impl GeminiVision {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VisionExtractor for GeminiVision {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn extract(&self, jpeg_b64: &str) -> Result<CodeExtraction> {
        let reply = self.client.generate(EXTRACTION_PROMPT, Some(jpeg_b64)).await?;
        CodeExtraction::from_reply(&reply)
    }
}

pub struct OpenAiVision {
    client: ChatCompletionsClient,
}

impl OpenAiVision {
    pub fn new(client: ChatCompletionsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VisionExtractor for OpenAiVision {
    fn name(&self) -> &str {
        "openai"
    }

    async fn extract(&self, jpeg_b64: &str) -> Result<CodeExtraction> {
        let message = ChatMessage::user_with_jpeg(jpeg_b64, EXTRACTION_PROMPT);
        let reply = self.client.chat(vec![message], VISION_PARAMS).await?;
        if reply.is_empty() {
            return Ok(CodeExtraction::none());
        }
        CodeExtraction::from_reply(&reply)
    }
}

/// Ordered list of extractors with a canned fallback.
#[derive(Clone, Default)]
pub struct VisionChain {
    providers: Vec<Arc<dyn VisionExtractor>>,
}

impl VisionChain {
    pub fn new(providers: Vec<Arc<dyn VisionExtractor>>) -> Self {
        Self { providers }
    }

    /// Gemini first, then OpenAI, skipping providers without a key.
    pub fn from_config(config: &ProviderConfig) -> Self {
        let mut providers: Vec<Arc<dyn VisionExtractor>> = Vec::new();
        if let Some(key) = &config.google_api_key {
            providers.push(Arc::new(GeminiVision::new(GeminiClient::new(
                key.clone(),
                config.gemini_model.clone(),
            ))));
        }
        if let Some(key) = &config.openai_api_key {
            providers.push(Arc::new(OpenAiVision::new(ChatCompletionsClient::openai(
                key.clone(),
                config.openai_vision_model.clone(),
            ))));
        }
        Self::new(providers)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Never fails; see the module docs for the fallback.
    pub async fn extract(&self, jpeg_b64: &str) -> CodeExtraction {
        for provider in &self.providers {
            match provider.extract(jpeg_b64).await {
                Ok(extraction) => {
                    debug!(
                        provider = provider.name(),
                        has_code = extraction.has_code,
                        "Extraction complete"
                    );
                    return extraction;
                }
                Err(e) => warn!(
                    provider = provider.name(),
                    error = %e,
                    "Vision provider failed, trying next"
                ),
            }
        }
        debug!("No vision provider succeeded, using fallback extraction");
        CodeExtraction::unavailable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Scripted {
        name: &'static str,
        reply: Option<CodeExtraction>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn ok(name: &'static str, reply: CodeExtraction) -> Arc<Self> {
            Arc::new(Self { name, reply: Some(reply), calls: AtomicUsize::new(0) })
        }

        fn failing(name: &'static str) -> Arc<Self> {
            Arc::new(Self { name, reply: None, calls: AtomicUsize::new(0) })
        }
    }

    #[async_trait]
    impl VisionExtractor for Scripted {
        fn name(&self) -> &str {
            self.name
        }

        async fn extract(&self, _jpeg_b64: &str) -> Result<CodeExtraction> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply
                .clone()
                .ok_or_else(|| ModelError::Request("boom".to_string()))
        }
    }

    fn rust_snippet() -> CodeExtraction {
        CodeExtraction {
            has_code: true,
            code: Some("fn main() {}".into()),
            language: Some("rust".into()),
            file_name: Some("main.rs".into()),
        }
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let first = Scripted::ok("first", rust_snippet());
        let second = Scripted::ok("second", CodeExtraction::none());
        let chain =
            VisionChain::new(vec![first.clone() as Arc<dyn VisionExtractor>, second.clone()]);

        assert_eq!(chain.extract("img").await, rust_snippet());
        assert_eq!(second.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failure_falls_through() {
        let first = Scripted::failing("first");
        let second = Scripted::ok("second", rust_snippet());
        let chain = VisionChain::new(vec![first.clone() as Arc<dyn VisionExtractor>, second]);

        assert_eq!(chain.extract("img").await, rust_snippet());
        assert_eq!(first.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_all_failing_uses_fallback() {
        let chain = VisionChain::new(vec![
            Scripted::failing("a") as Arc<dyn VisionExtractor>,
            Scripted::failing("b"),
        ]);
        let extraction = chain.extract("img").await;
        assert_eq!(extraction, CodeExtraction::unavailable());
        assert_eq!(extraction.file_name.as_deref(), Some("code.js"));
        assert!(extraction.code().unwrap().starts_with("// Vision AI temporarily unavailable"));
    }

    #[tokio::test]
    async fn test_empty_chain_uses_fallback() {
        let chain = VisionChain::from_config(&ProviderConfig::default());
        assert!(chain.is_empty());
        assert_eq!(chain.extract("img").await, CodeExtraction::unavailable());
    }

    #[test]
    fn test_chain_order_from_config() {
        let config = ProviderConfig::default().with_openai_key("o").with_google_key("g");
        let chain = VisionChain::from_config(&config);
        let names: Vec<&str> = chain.providers.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["gemini", "openai"]);
    }

    #[test]
    fn test_from_reply() {
        let reply = "```json\n{\"has_code\": true, \"code\": \"print(1)\", \"language\": \"python\"}\n```";
        let extraction = CodeExtraction::from_reply(reply).unwrap();
        assert_eq!(extraction.code(), Some("print(1)"));

        assert_eq!(CodeExtraction::from_reply("I see a cat").unwrap(), CodeExtraction::none());
        assert!(CodeExtraction::from_reply("{not json}").is_err());
    }

    #[test]
    fn test_code_requires_flag_and_content() {
        let mut extraction = rust_snippet();
        extraction.has_code = false;
        assert_eq!(extraction.code(), None);

        let empty = CodeExtraction {
            has_code: true,
            code: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(empty.code(), None);
    }
}
