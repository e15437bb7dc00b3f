//! REST API for HackMentor.
//!
//! - Screen analysis (`/api/analyze-screen`)
//! - Mentor chat and direct code review
//! - Email one-time-code signup, login and session lookup
//! - Health and provider setup checks
//!
//! # Example
//!
//! ```ignore
//! use mentor_api::{auth::LogMailer, ApiConfig, AppState, serve};
//! use mentor_llm::{MentorPipeline, ProviderConfig};
//! use mentor_persistence::UserStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let providers = ProviderConfig::from_env();
//!     let state = AppState::new(
//!         ApiConfig::default(),
//!         MentorPipeline::from_config(&providers),
//!         UserStore::new(mentor_core::runtime_state_dir()),
//!         Arc::new(LogMailer::new()),
//!     );
//!     serve(state).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;
pub mod types;

pub use config::ApiConfig;
pub use error::{ApiError, Result};
pub use router::{create_router, serve};
pub use state::AppState;
