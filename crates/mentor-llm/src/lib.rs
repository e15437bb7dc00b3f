//! Model clients and the analysis pipeline for HackMentor.
//!
//! - **client**: OpenAI-compatible chat completions (Groq, OpenAI)
//! - **gemini**: Google Gemini `generateContent`
//! - **vision**: screenshot to code extraction with a provider chain
//! - **review**: issue detection, mentor summaries and general chat
//! - **pipeline**: the server-side flows built from the pieces above

pub mod client;
pub mod config;
pub mod error;
pub mod gemini;
pub mod model;
pub mod parse;
pub mod pipeline;
pub mod prompts;
pub mod review;
pub mod vision;

pub use client::{ChatCompletionsClient, ChatMessage, ContentPart, MessageContent};
pub use config::{ProviderConfig, ProviderStatus};
pub use error::{ModelError, Result};
pub use gemini::GeminiClient;
pub use model::{SamplingParams, TextModel, UnconfiguredModel};
pub use pipeline::{ChatReply, MentorPipeline, NO_CODE_MESSAGE, REVIEW_UNAVAILABLE_MESSAGE};
pub use review::{HistoryMessage, Reviewer};
pub use vision::{CodeExtraction, GeminiVision, OpenAiVision, VisionChain, VisionExtractor};
