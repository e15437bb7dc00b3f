//! Code review and conversation on top of a [`TextModel`].
//!
//! Every call reports model failures to the caller, which decides whether
//! to degrade. Unparseable review replies count as "no issues".

use std::sync::Arc;

use mentor_models::Issue;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::client::ChatMessage;
use crate::error::Result;
use crate::model::{TextModel, CONVERSATION_PARAMS, REVIEW_PARAMS};
use crate::parse::json_array_span;
use crate::prompts::{
    mentor_request, review_request, CHAT_SYSTEM_PROMPT, MENTOR_SYSTEM_PROMPT,
    REVIEWER_SYSTEM_PROMPT,
};

pub const EMPTY_MENTOR_REPLY: &str = "Unable to generate response.";
pub const MENTOR_ERROR_REPLY: &str = "Sorry, I encountered an error generating feedback.";
pub const EMPTY_CHAT_REPLY: &str = "Sorry, I could not generate a response.";

/// Number of prior turns forwarded to the chat model.
pub const HISTORY_WINDOW: usize = 5;

/// A prior turn as sent by the client. Extra fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

impl HistoryMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    fn to_chat_message(&self) -> ChatMessage {
        if self.role == "user" {
            ChatMessage::user(&self.content)
        } else {
            ChatMessage::assistant(&self.content)
        }
    }
}

/// Parses the issue list out of a review reply. Anything unparseable is
/// treated as no issues.
pub fn parse_issues(reply: &str) -> Vec<Issue> {
    let json = json_array_span(reply).unwrap_or("[]");
    match serde_json::from_str::<Vec<serde_json::Value>>(json) {
        Ok(values) => Issue::list_from_values(values),
        Err(e) => {
            warn!(error = %e, "Review reply was not a JSON array");
            Vec::new()
        }
    }
}

#[derive(Clone)]
pub struct Reviewer {
    model: Arc<dyn TextModel>,
}

impl Reviewer {
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self { model }
    }

    pub async fn analyze_code(&self, code: &str, language: &str) -> Result<Vec<Issue>> {
        let messages = vec![
            ChatMessage::system(REVIEWER_SYSTEM_PROMPT),
            ChatMessage::user(review_request(code, language)),
        ];
        let reply = self
            .model
            .complete(messages, REVIEW_PARAMS)
            .await
            .inspect_err(|e| {
                warn!(model = self.model.name(), error = %e, "Code analysis failed")
            })?;
        Ok(parse_issues(&reply))
    }

    /// Friendly summary of `issues` for the developer.
    pub async fn mentor_response(&self, issues: &[Issue], context: Option<&str>) -> Result<String> {
        let issues_json = serde_json::to_string_pretty(issues).unwrap_or_else(|_| "[]".to_string());
        let messages = vec![
            ChatMessage::system(MENTOR_SYSTEM_PROMPT),
            ChatMessage::user(mentor_request(&issues_json, context)),
        ];
        let reply = self
            .model
            .complete(messages, CONVERSATION_PARAMS)
            .await
            .inspect_err(|e| {
                warn!(model = self.model.name(), error = %e, "Mentor response failed")
            })?;
        if reply.trim().is_empty() {
            return Ok(EMPTY_MENTOR_REPLY.to_string());
        }
        Ok(reply)
    }

    /// Answers a conversational message using the last few turns as context.
    pub async fn general_chat(&self, message: &str, history: &[HistoryMessage]) -> Result<String> {
        let start = history.len().saturating_sub(HISTORY_WINDOW);
        let mut messages = Vec::with_capacity(HISTORY_WINDOW + 2);
        messages.push(ChatMessage::system(CHAT_SYSTEM_PROMPT));
        messages.extend(history[start..].iter().map(HistoryMessage::to_chat_message));
        messages.push(ChatMessage::user(message));

        let reply = self.model.complete(messages, CONVERSATION_PARAMS).await?;
        if reply.trim().is_empty() {
            return Ok(EMPTY_CHAT_REPLY.to_string());
        }
        Ok(reply)
    }
}
