//! Aggregate counters shown on the dashboard.

use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    /// Score of the most recent accepted analysis.
    pub code_quality: f64,
    /// Total issues reported across accepted analyses.
    pub suggestions: usize,
    /// Seconds since the dashboard opened.
    pub session_time: u64,
    pub health_score: f64,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self {
            code_quality: 0.0,
            suggestions: 0,
            session_time: 0,
            health_score: 10.0,
        }
    }
}

impl SessionStats {
    /// Folds an accepted analysis into the running totals.
    ///
    /// A zero score keeps the previous quality value.
    pub fn record_analysis(&mut self, result: &AnalysisResult) {
        self.suggestions += result.issues.len();
        if result.score != 0.0 {
            self.code_quality = result.score;
        }
    }
}
