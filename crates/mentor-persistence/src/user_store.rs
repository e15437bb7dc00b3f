//! Account database.
//!
//! Accounts live in a single JSON document keyed by normalized email:
//! ```text
//! base_path/
//! └── users.json
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use mentor_models::{UserId, UserProfile};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::atomic::{atomic_write_json, read_json_optional};
use crate::error::{PersistenceError, Result};

const USERS_FILE: &str = "users.json";
const SALT_BYTES: usize = 16;

/// Canonical form used for lookups: trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// An account as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredUser {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub salt: String,
    pub created_at: DateTime<Utc>,
}

impl StoredUser {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }

    fn password_matches(&self, password: &str) -> bool {
        hash_password(&self.salt, password) == self.password_hash
    }
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Manages persistence of accounts.
///
/// Writes are serialized through an internal lock so concurrent signups
/// cannot lose each other's updates.
pub struct UserStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl UserStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            path: base_path.into().join(USERS_FILE),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_all(&self) -> Result<BTreeMap<String, StoredUser>> {
        Ok(read_json_optional(&self.path)?.unwrap_or_default())
    }

    pub fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.load_all()?.remove(&normalize_email(email)))
    }

    pub fn exists(&self, email: &str) -> Result<bool> {
        Ok(self.find_by_email(email)?.is_some())
    }

    /// Creates an account.
    ///
    /// `name` defaults to the local part of the email address.
    ///
    /// # Errors
    /// Returns [`PersistenceError::AlreadyExists`] if the email is taken.
    pub fn create_user(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<UserProfile> {
        let email = normalize_email(email);
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut users = self.load_all()?;
        if users.contains_key(&email) {
            return Err(PersistenceError::AlreadyExists {
                kind: "user".to_string(),
                id: email,
            });
        }

        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());
        let salt = generate_salt();
        let user = StoredUser {
            id: UserId::new(),
            email: email.clone(),
            name,
            password_hash: hash_password(&salt, password),
            salt,
            created_at: Utc::now(),
        };
        let profile = user.profile();
        users.insert(email, user);
        atomic_write_json(&self.path, &users)?;

        info!(user_id = %profile.id, "Account created");
        Ok(profile)
    }

    /// Returns the account if the password is correct.
    pub fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<UserProfile>> {
        Ok(self
            .find_by_email(email)?
            .filter(|user| user.password_matches(password))
            .map(|user| user.profile()))
    }
}
