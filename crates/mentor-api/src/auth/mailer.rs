//! Delivery of signup codes.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

pub const MAIL_WEBHOOK_ENV: &str = "MENTOR_MAIL_WEBHOOK";

const OTP_SUBJECT: &str = "Your HackMentor verification code";

/// Logged at startup when no mail relay is configured.
pub const NO_MAILER_WARNING: &str = "MENTOR_MAIL_WEBHOOK not set; verification codes are not \
     delivered or logged, so signup cannot be completed";

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Failed to send OTP: {0}")]
    Delivery(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Whether codes actually leave this process.
    fn delivers_externally(&self) -> bool;

    async fn send_otp(&self, email: &str, otp: &str) -> Result<(), MailError>;
}

fn otp_body(otp: &str) -> String {
    format!(
        "Your HackMentor verification code is {}.\n\n\
         It expires in 10 minutes. If you did not request it, ignore this email.",
        otp
    )
}

/// Development mailer: logs that a code was sent and keeps the last one
/// in memory so tests can complete the signup flow.
#[derive(Default)]
pub struct LogMailer {
    last: Mutex<Option<(String, String)>>,
}

impl LogMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `(email, code)` most recently sent.
    pub fn last_sent(&self) -> Option<(String, String)> {
        self.last.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Mailer for LogMailer {
    fn delivers_externally(&self) -> bool {
        false
    }

    async fn send_otp(&self, email: &str, otp: &str) -> Result<(), MailError> {
        info!(to = email, "Verification code issued (log mailer, not delivered)");
        *self.last.lock().unwrap_or_else(|e| e.into_inner()) =
            Some((email.to_string(), otp.to_string()));
        Ok(())
    }
}

/// POSTs `{to, subject, text}` to a mail relay.
pub struct WebhookMailer {
    client: reqwest::Client,
    url: String,
}

impl WebhookMailer {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl Mailer for WebhookMailer {
    fn delivers_externally(&self) -> bool {
        true
    }

    async fn send_otp(&self, email: &str, otp: &str) -> Result<(), MailError> {
        let payload = json!({
            "to": email,
            "subject": OTP_SUBJECT,
            "text": otp_body(otp),
        });
        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MailError::Delivery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Mail webhook rejected message");
            return Err(MailError::Delivery(format!("webhook returned {}", status)));
        }
        info!(to = email, "Verification code sent");
        Ok(())
    }
}

/// Webhook mailer when `MENTOR_MAIL_WEBHOOK` is set, log mailer otherwise.
pub fn mailer_from_env() -> Arc<dyn Mailer> {
    let url = std::env::var(MAIL_WEBHOOK_ENV)
        .ok()
        .filter(|url| !url.trim().is_empty());
    match url {
        Some(url) => Arc::new(WebhookMailer::new(url.trim())),
        None => {
            warn!("{}", NO_MAILER_WARNING);
            Arc::new(LogMailer::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_mailer_keeps_last_code() {
        let mailer = LogMailer::new();
        assert!(mailer.last_sent().is_none());

        mailer.send_otp("a@b.co", "123456").await.unwrap();
        mailer.send_otp("c@d.co", "654321").await.unwrap();

        assert_eq!(
            mailer.last_sent(),
            Some(("c@d.co".to_string(), "654321".to_string()))
        );
        assert!(!mailer.delivers_externally());
    }

    #[test]
    fn test_missing_relay_warning_names_the_variable() {
        assert!(NO_MAILER_WARNING.starts_with(MAIL_WEBHOOK_ENV));
        assert!(NO_MAILER_WARNING.contains("signup cannot be completed"));
        assert!(!NO_MAILER_WARNING.contains("will only be logged"));
    }

    #[test]
    fn test_otp_body_mentions_code() {
        assert!(otp_body("424242").contains("424242"));
    }

    #[tokio::test]
    async fn test_webhook_failure_is_reported() {
        let mailer = WebhookMailer::new("http://127.0.0.1:9/unreachable");
        assert!(mailer.delivers_externally());
        assert!(mailer.send_otp("a@b.co", "123456").await.is_err());
    }
}
