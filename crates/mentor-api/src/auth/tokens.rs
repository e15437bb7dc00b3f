//! Opaque session tokens.

use std::time::Duration;

use mentor_models::{SessionClaims, UserProfile};
use rand::RngCore;

use super::ttl::TtlStore;

const TOKEN_BYTES: usize = 32;

/// 64 lowercase hex characters of OS-seeded randomness.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub struct TokenStore {
    sessions: TtlStore<SessionClaims>,
    ttl: Duration,
}

impl TokenStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: TtlStore::new(),
            ttl,
        }
    }

    pub fn issue(&self, user: &UserProfile) -> String {
        let token = generate_token();
        self.sessions.set(token.clone(), SessionClaims::from(user), self.ttl);
        token
    }

    pub fn resolve(&self, token: &str) -> Option<SessionClaims> {
        self.sessions.get(token)
    }

    pub fn purge_expired(&self) -> usize {
        self.sessions.purge_expired()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mentor_models::UserId;

    fn user() -> UserProfile {
        UserProfile {
            id: UserId::from_string("user-7"),
            email: "dev@example.com".into(),
            name: "dev".into(),
        }
    }

    #[test]
    fn test_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_token());
    }

    #[test]
    fn test_issue_and_resolve() {
        let store = TokenStore::new(Duration::from_secs(60));
        let token = store.issue(&user());

        let claims = store.resolve(&token).unwrap();
        assert_eq!(claims.user_id.as_str(), "user-7");
        assert!(store.resolve("bogus").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokens_expire() {
        let store = TokenStore::new(Duration::from_secs(7 * 24 * 3600));
        let token = store.issue(&user());
        tokio::time::advance(Duration::from_secs(7 * 24 * 3600 + 1)).await;
        assert!(store.resolve(&token).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_drops_unread_tokens() {
        let store = TokenStore::new(Duration::from_secs(10));
        store.issue(&user());
        store.issue(&user());
        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(store.purge_expired(), 2);
        assert_eq!(store.purge_expired(), 0);
    }
}
