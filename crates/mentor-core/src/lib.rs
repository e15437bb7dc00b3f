//! HackMentor Core - shared logic for the server, runtime and CLI.
//!
//! - **config**: state directory layout and environment loading
//! - **classifier**: decide whether a chat message asks for a code review
//! - **fingerprint**: stable identity of a code snippet
//! - **dedup**: suppress repeated analyses of unchanged code

pub mod classifier;
pub mod config;
pub mod dedup;
pub mod fingerprint;

pub use classifier::{classify_message, contains_code, extract_code, MessageKind};
pub use config::{
    config_dir, credentials_file, ensure_config_dir, ensure_runtime_state_dir, env_file,
    load_env, runtime_state_dir, state_dir, users_file,
};
pub use dedup::DedupGate;
pub use fingerprint::{code_context, fingerprint, CODE_CONTEXT_CHARS};
