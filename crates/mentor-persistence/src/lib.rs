//! Persistence layer for HackMentor.
//!
//! Crash-safe JSON files (write to a temp file, then rename) back the
//! server's account database and the CLI's saved session.
//!
//! # Example
//!
//! ```no_run
//! use mentor_persistence::UserStore;
//!
//! let store = UserStore::new("/home/user/.hackmentor/state");
//! let user = store.create_user("dev@example.com", "hunter22", None).unwrap();
//! assert_eq!(user.name, "dev");
//! ```

pub mod atomic;
pub mod credential_store;
pub mod error;
pub mod user_store;

pub use credential_store::{CredentialStore, Credentials};
pub use error::{PersistenceError, Result};
pub use user_store::{normalize_email, StoredUser, UserStore};
