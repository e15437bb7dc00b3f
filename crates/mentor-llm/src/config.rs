//! Provider keys and model names.

use std::fmt;

use serde::Serialize;

pub const GROQ_API_KEY_ENV: &str = "GROQ_API_KEY";
pub const GOOGLE_AI_API_KEY_ENV: &str = "GOOGLE_AI_API_KEY";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const TEXT_MODEL_ENV: &str = "MENTOR_TEXT_MODEL";
pub const VISION_MODEL_ENV: &str = "MENTOR_VISION_MODEL";

pub const DEFAULT_TEXT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_OPENAI_VISION_MODEL: &str = "gpt-4o-mini";

/// Which providers have keys. Reported by the setup check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProviderStatus {
    pub groq: bool,
    pub gemini_vision: bool,
    pub openai_vision: bool,
}

#[derive(Clone)]
pub struct ProviderConfig {
    pub groq_api_key: Option<String>,
    pub google_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub text_model: String,
    pub gemini_model: String,
    pub openai_vision_model: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            groq_api_key: None,
            google_api_key: None,
            openai_api_key: None,
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            openai_vision_model: DEFAULT_OPENAI_VISION_MODEL.to_string(),
        }
    }
}

// Keys stay out of logs.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("groq", &self.groq_api_key.is_some())
            .field("google", &self.google_api_key.is_some())
            .field("openai", &self.openai_api_key.is_some())
            .field("text_model", &self.text_model)
            .field("gemini_model", &self.gemini_model)
            .field("openai_vision_model", &self.openai_vision_model)
            .finish()
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ProviderConfig {
    /// Reads keys and model overrides from the environment.
    ///
    /// Missing keys are not an error; the affected provider is skipped.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            groq_api_key: non_empty_env(GROQ_API_KEY_ENV),
            google_api_key: non_empty_env(GOOGLE_AI_API_KEY_ENV),
            openai_api_key: non_empty_env(OPENAI_API_KEY_ENV),
            text_model: non_empty_env(TEXT_MODEL_ENV).unwrap_or(defaults.text_model),
            gemini_model: non_empty_env(VISION_MODEL_ENV).unwrap_or(defaults.gemini_model),
            openai_vision_model: defaults.openai_vision_model,
        }
    }

    pub fn with_groq_key(mut self, key: impl Into<String>) -> Self {
        self.groq_api_key = Some(key.into());
        self
    }

    pub fn with_google_key(mut self, key: impl Into<String>) -> Self {
        self.google_api_key = Some(key.into());
        self
    }

    pub fn with_openai_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = Some(key.into());
        self
    }

    pub fn status(&self) -> ProviderStatus {
        ProviderStatus {
            groq: self.groq_api_key.is_some(),
            gemini_vision: self.google_api_key.is_some(),
            openai_vision: self.openai_api_key.is_some(),
        }
    }
}
