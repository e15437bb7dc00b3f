//! Dashboard events.

use mentor_models::ChatTurn;

/// Events broadcast by the dashboard.
#[derive(Debug, Clone)]
pub enum DashboardEvent {
    /// A turn was added to the transcript.
    TurnAppended(ChatTurn),
    /// An analysis arrived but showed no new code.
    AnalysisSuppressed {
        /// Fingerprint of the suppressed result, if it had code.
        fingerprint: Option<String>,
    },
    CaptureStarted,
    CaptureStopped,
    /// A screen analysis could not be completed.
    AnalysisFailed {
        error: String,
    },
}

impl DashboardEvent {
    /// Returns true if this is an error event.
    pub fn is_error(&self) -> bool {
        matches!(self, DashboardEvent::AnalysisFailed { .. })
    }

    /// The appended turn, if this event carries one.
    pub fn turn(&self) -> Option<&ChatTurn> {
        match self {
            DashboardEvent::TurnAppended(turn) => Some(turn),
            _ => None,
        }
    }
}
