//! Client runtime for HackMentor.
//!
//! This crate drives a mentoring session from the developer's side:
//! - `CaptureScheduler` - samples a `FrameSource` on a fixed interval, one analysis in flight at a time
//! - `FrameEncoder` - turns frames into base64 JPEG payloads
//! - `MentorBackend` - transport to the HackMentor API (`HttpBackend`)
//! - `Conversation` - append-only chat transcript
//! - `SpeechAnnouncer` - narrates assistant turns, newest utterance wins
//! - `Dashboard` - wires the above together and broadcasts `DashboardEvent`s
//!
//! # Example
//!
//! ```ignore
//! use mentor_runtime::{Dashboard, HttpBackend, NullSpeech, RuntimeConfig, ScreenshotFileSource};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RuntimeConfig::default();
//!     let backend = Arc::new(HttpBackend::new(&config.server_url));
//!     let source = Arc::new(ScreenshotFileSource::new("/tmp/screen.png"));
//!     let dashboard = Dashboard::new(&config, backend, source, Arc::new(NullSpeech));
//!
//!     let mut events = dashboard.subscribe();
//!     dashboard.start_capture().await?;
//!
//!     while let Ok(event) = events.recv().await {
//!         println!("{:?}", event);
//!     }
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod conversation;
pub mod dashboard;
pub mod error;
pub mod event;
pub mod frame;
pub mod scheduler;
pub mod source;
pub mod speech;

pub use backend::{
    AnalyzeEnvelope, AuthSession, ChatEnvelope, HistoryEntry, HttpBackend, MentorBackend,
};
pub use config::{RuntimeConfig, VoiceSettings, MIN_CAPTURE_INTERVAL};
pub use conversation::Conversation;
pub use dashboard::{Dashboard, NETWORK_ERROR_REPLY, NO_RESPONSE_REPLY};
pub use error::{Result, RuntimeError};
pub use event::DashboardEvent;
pub use frame::{Frame, FrameEncoder};
pub use scheduler::{CaptureOutcome, CaptureScheduler, FrameSink};
pub use source::{CaptureStream, FrameSource, ScreenshotFileSource};
pub use speech::{ConsoleSpeech, NullSpeech, SpeechAnnouncer, SpeechEngine, Utterance};
