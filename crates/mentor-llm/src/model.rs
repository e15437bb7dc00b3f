//! The text model seam used by the reviewer.

use async_trait::async_trait;

use crate::client::ChatMessage;
use crate::error::{ModelError, Result};

/// Generation settings for one call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl SamplingParams {
    pub const fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature,
            max_tokens,
        }
    }
}

/// Low temperature for structured issue lists.
pub const REVIEW_PARAMS: SamplingParams = SamplingParams::new(0.3, 2000);
/// Conversational replies.
pub const CONVERSATION_PARAMS: SamplingParams = SamplingParams::new(0.7, 500);
pub const VISION_PARAMS: SamplingParams = SamplingParams::new(0.1, 2000);

/// A chat-style text model.
#[async_trait]
pub trait TextModel: Send + Sync {
    fn name(&self) -> &str;

    /// Returns the reply text. An empty string means the model produced
    /// no content.
    async fn complete(&self, messages: Vec<ChatMessage>, params: SamplingParams) -> Result<String>;
}

/// Stand-in when no key is configured. Every call fails, which the
/// reviewer turns into its fallback answers.
#[derive(Debug, Clone)]
pub struct UnconfiguredModel {
    provider: String,
}

impl UnconfiguredModel {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
        }
    }
}

#[async_trait]
impl TextModel for UnconfiguredModel {
    fn name(&self) -> &str {
        &self.provider
    }

    async fn complete(
        &self,
        _messages: Vec<ChatMessage>,
        _params: SamplingParams,
    ) -> Result<String> {
        Err(ModelError::NotConfigured(self.provider.clone()))
    }
}
