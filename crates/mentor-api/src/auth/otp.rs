//! One-time signup codes.

use std::time::Duration;

use mentor_persistence::normalize_email;
use rand::Rng;

use super::ttl::TtlStore;

/// Storage key for an email's pending code.
pub fn otp_key(email: &str) -> String {
    format!("otp:{}", normalize_email(email))
}

/// A uniformly random six-digit code without a leading zero.
pub fn generate_otp() -> String {
    rand::thread_rng().gen_range(100_000..=999_999u32).to_string()
}

pub struct OtpStore {
    codes: TtlStore<String>,
    ttl: Duration,
}

impl OtpStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            codes: TtlStore::new(),
            ttl,
        }
    }

    /// Issues a fresh code for `email`, replacing any pending one.
    pub fn issue(&self, email: &str) -> String {
        let otp = generate_otp();
        self.codes.set(otp_key(email), otp.clone(), self.ttl);
        otp
    }

    /// Checks a submitted code. A match consumes it.
    pub fn verify(&self, email: &str, otp: &str) -> bool {
        let otp = otp.trim();
        self.codes
            .take_if(&otp_key(email), |stored| stored == otp)
            .is_some()
    }

    pub fn purge_expired(&self) -> usize {
        self.codes.purge_expired()
    }
}
