//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use mentor_llm::{MentorPipeline, ProviderStatus};
use mentor_persistence::UserStore;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use crate::auth::{Mailer, OtpStore, TokenStore};
use crate::config::ApiConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    pub pipeline: Arc<MentorPipeline>,
    pub users: Arc<UserStore>,
    pub otps: Arc<OtpStore>,
    pub tokens: Arc<TokenStore>,
    pub mailer: Arc<dyn Mailer>,
    /// Provider keys present at startup, for the setup check.
    pub providers: ProviderStatus,
}

impl AppState {
    pub fn new(
        config: ApiConfig,
        pipeline: MentorPipeline,
        users: UserStore,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let otps = OtpStore::new(config.auth.otp_ttl);
        let tokens = TokenStore::new(config.auth.token_ttl);
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            users: Arc::new(users),
            otps: Arc::new(otps),
            tokens: Arc::new(tokens),
            mailer,
            providers: ProviderStatus::default(),
        }
    }

    pub fn with_provider_status(mut self, providers: ProviderStatus) -> Self {
        self.providers = providers;
        self
    }

    /// Drops expired one-time codes and session tokens.
    pub fn purge_expired(&self) -> usize {
        self.otps.purge_expired() + self.tokens.purge_expired()
    }

    /// Sweeps expired auth entries every `auth.purge_interval`. Codes and
    /// tokens that are never read again would otherwise stay in memory.
    pub fn spawn_purge_task(&self) -> JoinHandle<()> {
        let state = self.clone();
        let period = self.config.auth.purge_interval.max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let purged = state.purge_expired();
                if purged > 0 {
                    debug!(purged, "Purged expired auth entries");
                }
            }
        })
    }
}
