//! Session credentials saved by the CLI after login.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use mentor_models::UserProfile;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::atomic::{atomic_write_json, read_json_optional};
use crate::error::{PersistenceError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub server_url: String,
    pub token: String,
    pub user: UserProfile,
    pub saved_at: DateTime<Utc>,
}

impl Credentials {
    pub fn new(server_url: impl Into<String>, token: impl Into<String>, user: UserProfile) -> Self {
        Self {
            server_url: server_url.into(),
            token: token.into(),
            user,
            saved_at: Utc::now(),
        }
    }
}

pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saves credentials, readable only by the current user on unix.
    pub fn save(&self, credentials: &Credentials) -> Result<()> {
        atomic_write_json(&self.path, credentials)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600)).map_err(
                |source| PersistenceError::WriteError {
                    path: self.path.clone(),
                    source,
                },
            )?;
        }
        debug!(path = %self.path.display(), "Saved credentials");
        Ok(())
    }

    pub fn load(&self) -> Result<Option<Credentials>> {
        read_json_optional(&self.path)
    }

    /// Removes saved credentials. Returns false if none were saved.
    pub fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&self.path).map_err(|source| PersistenceError::WriteError {
            path: self.path.clone(),
            source,
        })?;
        Ok(true)
    }
}
