//! Email one-time-code signup and opaque session tokens.

mod mailer;
mod otp;
mod tokens;
mod ttl;

use std::time::Duration;

use axum::http::{header::AUTHORIZATION, HeaderMap};

pub use mailer::{
    mailer_from_env, LogMailer, MailError, Mailer, WebhookMailer, MAIL_WEBHOOK_ENV,
    NO_MAILER_WARNING,
};
pub use otp::{generate_otp, otp_key, OtpStore};
pub use tokens::{generate_token, TokenStore};
pub use ttl::TtlStore;

pub const OTP_LENGTH: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// How long a signup code stays valid.
    pub otp_ttl: Duration,
    /// How long a session token stays valid.
    pub token_ttl: Duration,
    /// How often expired codes and tokens are swept.
    pub purge_interval: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            otp_ttl: Duration::from_secs(600),
            token_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            purge_interval: Duration::from_secs(60),
        }
    }
}

impl AuthConfig {
    pub fn with_otp_ttl(mut self, ttl: Duration) -> Self {
        self.otp_ttl = ttl;
        self
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Zero is raised to one second.
    pub fn with_purge_interval(mut self, interval: Duration) -> Self {
        self.purge_interval = interval.max(Duration::from_secs(1));
        self
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers), Some("abc123"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc123"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_default_lifetimes() {
        let config = AuthConfig::default();
        assert_eq!(config.otp_ttl.as_secs(), 600);
        assert_eq!(config.token_ttl.as_secs(), 604_800);
        assert_eq!(config.purge_interval.as_secs(), 60);
        assert_eq!(
            config.with_purge_interval(Duration::ZERO).purge_interval,
            Duration::from_secs(1)
        );
    }
}
