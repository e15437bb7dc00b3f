//! Results produced by the screen-analysis and code-review pipelines.

use serde::{Deserialize, Serialize};

use crate::issue::{score_issues, Issue, SeverityCounts};

/// Outcome of analysing one captured frame.
///
/// `code_fingerprint` is `None` when no code was found on screen; the
/// client treats such results as non-reportable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub message: String,

    #[serde(default)]
    pub issues: Vec<Issue>,

    pub score: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    #[serde(rename = "code_hash", default)]
    pub code_fingerprint: Option<String>,

    /// Leading excerpt of the analysed code, for display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_context: Option<String>,
}

impl AnalysisResult {
    /// A result for a frame with no recognisable code. Scores zero.
    pub fn no_code(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            issues: Vec::new(),
            score: 0.0,
            language: None,
            file_name: None,
            code_fingerprint: None,
            code_context: None,
        }
    }

    pub fn has_code(&self) -> bool {
        self.code_fingerprint.is_some()
    }
}

/// Response body of a direct code review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeReview {
    pub message: String,
    #[serde(default)]
    pub issues: Vec<Issue>,
    pub score: f64,
    pub language: String,
    #[serde(flatten)]
    pub counts: SeverityCounts,
}

impl CodeReview {
    pub fn new(
        message: impl Into<String>,
        issues: Vec<Issue>,
        language: impl Into<String>,
    ) -> Self {
        let score = score_issues(&issues);
        let counts = SeverityCounts::from_issues(&issues);
        Self {
            message: message.into(),
            issues,
            score,
            language: language.into(),
            counts,
        }
    }
}
