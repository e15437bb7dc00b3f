//! Suppression of repeated analyses.
//!
//! The capture loop re-analyses the screen every few seconds, but the
//! developer only wants feedback when the code actually changes.

use mentor_models::AnalysisResult;
use tracing::debug;

/// Remembers the fingerprint of the last reported analysis.
#[derive(Debug, Default)]
pub struct DedupGate {
    last_fingerprint: Option<String>,
}

impl DedupGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decides whether `result` should be surfaced.
    ///
    /// Results without code are never reportable. Accepting a result makes
    /// its fingerprint the new reference.
    pub fn accept(&mut self, result: &AnalysisResult) -> bool {
        let Some(fingerprint) = result.code_fingerprint.as_deref() else {
            debug!("Analysis without code suppressed");
            return false;
        };
        if self.last_fingerprint.as_deref() == Some(fingerprint) {
            debug!(fingerprint, "Unchanged code suppressed");
            return false;
        }
        self.last_fingerprint = Some(fingerprint.to_string());
        true
    }

    pub fn last_fingerprint(&self) -> Option<&str> {
        self.last_fingerprint.as_deref()
    }

    pub fn reset(&mut self) {
        self.last_fingerprint = None;
    }
}
