//! Core data models for HackMentor.
//!
//! This crate provides the fundamental data types shared by the server,
//! the capture runtime and the CLI: review issues, analysis results,
//! conversation turns, session statistics and user identities.

pub mod analysis;
pub mod chat;
pub mod ids;
pub mod issue;
pub mod stats;
pub mod user;

// Re-export main types
pub use analysis::{AnalysisResult, CodeReview};
pub use chat::{ChatTurn, Role};
pub use ids::{TurnId, UserId};
pub use issue::{score_issues, Issue, IssueKind, Severity, SeverityCounts};
pub use stats::SessionStats;
pub use user::{SessionClaims, UserProfile};
