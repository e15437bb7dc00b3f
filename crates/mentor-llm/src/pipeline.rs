//! Server-side flows: screen analysis, direct review and chat.

use std::sync::Arc;

use mentor_core::{classify_message, code_context, fingerprint, MessageKind};
use mentor_models::{score_issues, AnalysisResult, CodeReview, Issue};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::client::ChatCompletionsClient;
use crate::config::ProviderConfig;
use crate::error::Result;
use crate::model::{TextModel, UnconfiguredModel};
use crate::review::{HistoryMessage, Reviewer, MENTOR_ERROR_REPLY};
use crate::vision::VisionChain;

pub const DEFAULT_LANGUAGE: &str = "javascript";

/// Shown when nothing readable was captured.
pub const NO_CODE_MESSAGE: &str = "👋 Hi! I can't extract code from the screenshot right now.\n\n💡 Try this instead:\n1. Paste your code directly in the chat\n2. Ask me to 'review this code:' followed by your code\n3. I'll analyze it and give you feedback!\n\nExample:\n```\nreview this code:\nfunction hello() {\n  console.log('hi')\n}\n```";

/// Shown when code was found but could not be reviewed.
pub const REVIEW_UNAVAILABLE_MESSAGE: &str = "⚠️ I found your code but couldn't review it right now.\n\n💡 I'll try again on the next capture, or paste the code in the chat and ask me to review it.";

/// Answer to a chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(rename = "isCodeReview")]
    pub is_code_review: bool,
    /// Number of issues found, for review replies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues: Option<usize>,
}

#[derive(Clone)]
pub struct MentorPipeline {
    vision: VisionChain,
    reviewer: Reviewer,
}

impl MentorPipeline {
    pub fn new(vision: VisionChain, reviewer: Reviewer) -> Self {
        Self { vision, reviewer }
    }

    pub fn from_config(config: &ProviderConfig) -> Self {
        let text_model: Arc<dyn TextModel> = match &config.groq_api_key {
            Some(key) => Arc::new(ChatCompletionsClient::groq(
                key.clone(),
                config.text_model.clone(),
            )),
            None => Arc::new(UnconfiguredModel::new("groq")),
        };
        Self::new(VisionChain::from_config(config), Reviewer::new(text_model))
    }

    /// Extracts code from a screenshot and reviews it.
    pub async fn analyze_screen(&self, jpeg_b64: &str) -> AnalysisResult {
        let extraction = self.vision.extract(jpeg_b64).await;
        let Some(code) = extraction.code() else {
            debug!("No code in screenshot");
            return AnalysisResult::no_code(NO_CODE_MESSAGE);
        };

        let language = extraction.language.as_deref().unwrap_or(DEFAULT_LANGUAGE);
        let context = format!("Language: {}", language);
        let (issues, message) = match self.review_stages(code, language, &context).await {
            Ok(feedback) => feedback,
            Err(e) => {
                // Unreviewed code never carries a fingerprint.
                warn!(error = %e, "Screen review failed");
                return AnalysisResult::no_code(REVIEW_UNAVAILABLE_MESSAGE);
            }
        };
        let score = score_issues(&issues);
        let code_fingerprint = fingerprint(code);

        info!(
            language,
            issues = issues.len(),
            score,
            fingerprint = %code_fingerprint,
            "Screen analysed"
        );

        AnalysisResult {
            message,
            score,
            issues,
            language: extraction.language.clone(),
            file_name: extraction.file_name.clone(),
            code_fingerprint: Some(code_fingerprint),
            code_context: Some(code_context(code)),
        }
    }

    async fn review_stages(
        &self,
        code: &str,
        language: &str,
        context: &str,
    ) -> Result<(Vec<Issue>, String)> {
        let issues = self.reviewer.analyze_code(code, language).await?;
        let message = self.reviewer.mentor_response(&issues, Some(context)).await?;
        Ok((issues, message))
    }

    /// Reviews code submitted directly. Model failures degrade to no issues
    /// and a fixed apology.
    pub async fn review_code(&self, code: &str, language: Option<&str>) -> CodeReview {
        let language = language
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_LANGUAGE);
        let context = format!("Language: {}", language);
        let (issues, message) = self.absorbing_review(code, language, Some(&context)).await;
        CodeReview::new(message, issues, language)
    }

    async fn absorbing_review(
        &self,
        code: &str,
        language: &str,
        context: Option<&str>,
    ) -> (Vec<Issue>, String) {
        let issues = self
            .reviewer
            .analyze_code(code, language)
            .await
            .unwrap_or_default();
        let message = self
            .reviewer
            .mentor_response(&issues, context)
            .await
            .unwrap_or_else(|_| MENTOR_ERROR_REPLY.to_string());
        (issues, message)
    }

    /// Routes a chat message to the reviewer or to general conversation.
    pub async fn chat(&self, message: &str, history: &[HistoryMessage]) -> Result<ChatReply> {
        match classify_message(message) {
            MessageKind::CodeReview { code } => {
                let (issues, response) = self.absorbing_review(&code, DEFAULT_LANGUAGE, None).await;
                debug!(issues = issues.len(), "Chat message reviewed as code");
                Ok(ChatReply {
                    response,
                    is_code_review: true,
                    issues: Some(issues.len()),
                })
            }
            MessageKind::General => {
                let response = self.reviewer.general_chat(message, history).await?;
                Ok(ChatReply {
                    response,
                    is_code_review: false,
                    issues: None,
                })
            }
        }
    }
}
