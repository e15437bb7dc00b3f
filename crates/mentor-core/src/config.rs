//! Shared configuration for HackMentor.
//!
//! All application data is stored under `~/.hackmentor/`:
//!
//! ```text
//! ~/.hackmentor/
//! ├── config/       # .env.local with provider keys
//! └── state/        # users.json (server), credentials.json (client)
//! ```
//!
//! # Environment Variables
//!
//! - `MENTOR_STATE_DIR`: Override the base state directory
//! - `MENTOR_CONFIG_DIR`: Override the config directory

use std::path::{Path, PathBuf};

use tracing::debug;

pub const STATE_DIR_ENV: &str = "MENTOR_STATE_DIR";
pub const CONFIG_DIR_ENV: &str = "MENTOR_CONFIG_DIR";

const DEFAULT_STATE_DIR: &str = ".hackmentor";
const CONFIG_SUBDIR: &str = "config";
const STATE_SUBDIR: &str = "state";

/// Get the HackMentor state directory.
///
/// Resolution order:
/// 1. `MENTOR_STATE_DIR` environment variable if set
/// 2. `~/.hackmentor` if the home directory is available
/// 3. `.hackmentor` in the current directory
pub fn state_dir() -> PathBuf {
    std::env::var(STATE_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(DEFAULT_STATE_DIR))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
        })
}

/// Get the user config directory.
pub fn config_dir() -> PathBuf {
    std::env::var(CONFIG_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| state_dir().join(CONFIG_SUBDIR))
}

pub fn runtime_state_dir() -> PathBuf {
    state_dir().join(STATE_SUBDIR)
}

/// Environment file for secrets (API keys, mail webhook).
pub fn env_file() -> PathBuf {
    config_dir().join(".env.local")
}

/// Account database used by the server.
pub fn users_file() -> PathBuf {
    runtime_state_dir().join("users.json")
}

/// Session token saved by the CLI after login.
pub fn credentials_file() -> PathBuf {
    runtime_state_dir().join("credentials.json")
}

/// Load environment files into the process environment.
///
/// Files are applied in order and never override variables that are
/// already set: the config directory's `.env.local`, then `.env.local`
/// and `.env` in the working directory. Returns the files that were found.
pub fn load_env() -> Vec<PathBuf> {
    let candidates = [env_file(), PathBuf::from(".env.local"), PathBuf::from(".env")];
    candidates
        .into_iter()
        .filter(|path| load_env_file(path))
        .collect()
}

fn load_env_file(path: &Path) -> bool {
    match dotenvy::from_path(path) {
        Ok(()) => {
            debug!(path = %path.display(), "Loaded environment file");
            true
        }
        Err(_) => false,
    }
}

/// Ensure the runtime state directory exists.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn ensure_runtime_state_dir() -> std::io::Result<()> {
    let dir = runtime_state_dir();
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }
    Ok(())
}

/// Ensure the config directory exists.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn ensure_config_dir() -> std::io::Result<()> {
    let dir = config_dir();
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }
    Ok(())
}
