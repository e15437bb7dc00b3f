//! Dashboard controller.
//!
//! Owns one mentoring session on the client: capture, the transcript, the
//! dedup gate, session stats and speech. Turns are appended in completion
//! order, so a quick chat reply can land before a slower analysis that
//! was dispatched first.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mentor_core::DedupGate;
use mentor_models::{AnalysisResult, ChatTurn, Role, SessionStats};
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::backend::MentorBackend;
use crate::config::RuntimeConfig;
use crate::conversation::Conversation;
use crate::error::Result;
use crate::event::DashboardEvent;
use crate::frame::FrameEncoder;
use crate::scheduler::{CaptureOutcome, CaptureScheduler, FrameSink};
use crate::source::FrameSource;
use crate::speech::{SpeechAnnouncer, SpeechEngine};

/// Appended when the backend cannot be reached.
pub const NETWORK_ERROR_REPLY: &str = "Network error, please try again.";

/// Appended when the backend answers without a usable reply.
pub const NO_RESPONSE_REPLY: &str = "Sorry, I could not generate a response.";

struct DashboardInner {
    backend: Arc<dyn MentorBackend>,
    conversation: Mutex<Conversation>,
    gate: Mutex<DedupGate>,
    stats: Mutex<SessionStats>,
    speech: Arc<SpeechAnnouncer>,
    events: broadcast::Sender<DashboardEvent>,
    history_window: usize,
    started_at: Instant,
}

impl DashboardInner {
    fn emit(&self, event: DashboardEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn append(&self, role: Role, content: impl Into<String>) -> ChatTurn {
        let turn = self
            .conversation
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .append(role, content);
        self.emit(DashboardEvent::TurnAppended(turn.clone()));
        turn
    }

    fn narrate(&self, text: &str) {
        if self.speech.is_muted() {
            return;
        }
        let speech = Arc::clone(&self.speech);
        let text = text.to_string();
        tokio::spawn(async move {
            speech.announce(&text).await;
        });
    }

    fn handle_analysis(&self, analysis: AnalysisResult) {
        let accepted = self
            .gate
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .accept(&analysis);
        if !accepted {
            self.emit(DashboardEvent::AnalysisSuppressed {
                fingerprint: analysis.code_fingerprint,
            });
            return;
        }

        self.stats
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .record_analysis(&analysis);
        info!(
            issues = analysis.issues.len(),
            score = analysis.score,
            "New code reviewed"
        );
        self.append(Role::Assistant, analysis.message.as_str());
        self.narrate(&analysis.message);
    }
}

#[async_trait]
impl FrameSink for DashboardInner {
    async fn on_frame(&self, jpeg_b64: String) {
        match self.backend.analyze_screen(&jpeg_b64).await {
            Ok(envelope) if envelope.success => match envelope.analysis {
                Some(analysis) => self.handle_analysis(analysis),
                None => self.emit(DashboardEvent::AnalysisFailed {
                    error: "Reply carried no analysis".to_string(),
                }),
            },
            Ok(envelope) => {
                let error = envelope.error.unwrap_or_else(|| "Analysis failed".to_string());
                warn!(error = %error, "Screen analysis rejected");
                self.emit(DashboardEvent::AnalysisFailed { error });
            }
            Err(e) => {
                warn!(error = %e, "Screen analysis failed");
                self.emit(DashboardEvent::AnalysisFailed {
                    error: e.to_string(),
                });
            }
        }
    }

    fn on_capture_started(&self) {
        self.emit(DashboardEvent::CaptureStarted);
    }

    fn on_capture_stopped(&self) {
        self.emit(DashboardEvent::CaptureStopped);
    }
}

pub struct Dashboard {
    inner: Arc<DashboardInner>,
    scheduler: CaptureScheduler,
}

impl Dashboard {
    pub fn new(
        config: &RuntimeConfig,
        backend: Arc<dyn MentorBackend>,
        source: Arc<dyn FrameSource>,
        speech: Arc<dyn SpeechEngine>,
    ) -> Self {
        let (events, _) = broadcast::channel(256);
        let inner = Arc::new(DashboardInner {
            backend,
            conversation: Mutex::new(Conversation::new()),
            gate: Mutex::new(DedupGate::new()),
            stats: Mutex::new(SessionStats::default()),
            speech: Arc::new(SpeechAnnouncer::new(
                speech,
                config.voice,
                config.speech_cancel_delay,
            )),
            events,
            history_window: config.history_window,
            started_at: Instant::now(),
        });
        let scheduler = CaptureScheduler::new(
            source,
            inner.clone(),
            FrameEncoder::new(config.jpeg_quality),
            config.capture_interval,
        );
        Self { inner, scheduler }
    }

    /// Returns `Ok(false)` if capture was already running.
    pub async fn start_capture(&self) -> Result<bool> {
        self.scheduler.start().await
    }

    pub async fn capture_now(&self) -> Result<CaptureOutcome> {
        self.scheduler.capture_now().await
    }

    pub fn stop_capture(&self) -> bool {
        self.scheduler.stop()
    }

    pub fn is_recording(&self) -> bool {
        self.scheduler.is_recording()
    }

    /// Adds the user's turn right away, then exactly one assistant turn
    /// once the backend answers. Blank input is ignored.
    ///
    /// Returns the assistant turn.
    pub async fn send_message(&self, text: &str) -> Option<ChatTurn> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let history = {
            let mut conversation = self
                .inner
                .conversation
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            let history = conversation.history(self.inner.history_window);
            let turn = conversation.append(Role::User, text);
            self.inner.emit(DashboardEvent::TurnAppended(turn));
            history
        };

        let reply = match self.inner.backend.chat(text, &history).await {
            Ok(envelope) if envelope.success => {
                debug!(code_review = envelope.is_code_review, "Chat answered");
                match envelope.response.filter(|r| !r.trim().is_empty()) {
                    Some(response) => {
                        self.inner.narrate(&response);
                        response
                    }
                    None => NO_RESPONSE_REPLY.to_string(),
                }
            }
            Ok(envelope) => {
                warn!(error = ?envelope.error, "Chat rejected");
                NO_RESPONSE_REPLY.to_string()
            }
            Err(e) => {
                warn!(error = %e, "Chat failed");
                NETWORK_ERROR_REPLY.to_string()
            }
        };
        Some(self.inner.append(Role::Assistant, reply))
    }

    pub fn set_muted(&self, muted: bool) {
        self.inner.speech.set_muted(muted);
    }

    /// Returns true if voice is now enabled.
    pub fn toggle_voice(&self) -> bool {
        self.inner.speech.toggle()
    }

    pub fn is_muted(&self) -> bool {
        self.inner.speech.is_muted()
    }

    pub fn transcript(&self) -> Vec<ChatTurn> {
        self.inner
            .conversation
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .turns()
            .to_vec()
    }

    pub fn stats(&self) -> SessionStats {
        let mut stats = self
            .inner
            .stats
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        stats.session_time = self.inner.started_at.elapsed().as_secs();
        stats
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.inner.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{AnalyzeEnvelope, ChatEnvelope, HistoryEntry};
    use crate::error::RuntimeError;
    use crate::frame::Frame;
    use crate::source::CaptureStream;
    use mentor_models::{Issue, IssueKind, Severity};
    use std::collections::VecDeque;
    use std::time::Duration;
    use tokio::sync::broadcast::error::TryRecvError;

    struct StillStream;

    #[async_trait]
    impl CaptureStream for StillStream {
        fn sample(&self) -> Result<Option<Frame>> {
            Ok(Some(Frame::new(2, 2, vec![0; 12])))
        }

        async fn ended(&self) {
            std::future::pending::<()>().await
        }

        fn release(&self) {}
    }

    struct StillSource;

    #[async_trait]
    impl FrameSource for StillSource {
        async fn open(&self) -> Result<Arc<dyn CaptureStream>> {
            Ok(Arc::new(StillStream))
        }
    }

    /// Replays queued analyses; chat answers depend on the message.
    #[derive(Default)]
    struct ScriptedBackend {
        analyses: Mutex<VecDeque<Result<AnalyzeEnvelope>>>,
        histories: Mutex<Vec<Vec<HistoryEntry>>>,
        chat_delay: Duration,
    }

    impl ScriptedBackend {
        fn queue(&self, analysis: Result<AnalyzeEnvelope>) {
            self.analyses.lock().unwrap().push_back(analysis);
        }
    }

    #[async_trait]
    impl MentorBackend for ScriptedBackend {
        async fn analyze_screen(&self, _jpeg_b64: &str) -> Result<AnalyzeEnvelope> {
            self.analyses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(AnalyzeEnvelope::default()))
        }

        async fn chat(&self, message: &str, history: &[HistoryEntry]) -> Result<ChatEnvelope> {
            self.histories.lock().unwrap().push(history.to_vec());
            tokio::time::sleep(self.chat_delay).await;
            match message {
                "offline" => Err(RuntimeError::Transport("connection refused".to_string())),
                "refuse" => Ok(ChatEnvelope {
                    success: false,
                    error: Some("No message provided".to_string()),
                    ..Default::default()
                }),
                m if m.starts_with("review") => Ok(ChatEnvelope {
                    success: true,
                    response: Some("Found 1 issue.".to_string()),
                    is_code_review: true,
                    issues: Some(1),
                    error: None,
                }),
                _ => Ok(ChatEnvelope {
                    success: true,
                    response: Some("A closure captures its environment.".to_string()),
                    ..Default::default()
                }),
            }
        }
    }

    fn analysis(fingerprint: Option<&str>, score: f64, issues: usize) -> Result<AnalyzeEnvelope> {
        let mut result = AnalysisResult::no_code(format!("review of {:?}", fingerprint));
        result.code_fingerprint = fingerprint.map(str::to_string);
        result.score = score;
        result.issues = (0..issues)
            .map(|i| Issue::new(IssueKind::Bug, Severity::Warning, format!("issue {}", i)))
            .collect();
        Ok(AnalyzeEnvelope {
            success: true,
            analysis: Some(result),
            error: None,
        })
    }

    #[derive(Default)]
    struct SpokenLog(Mutex<Vec<String>>);

    impl SpeechEngine for SpokenLog {
        fn speak(&self, utterance: crate::speech::Utterance) {
            self.0.lock().unwrap().push(utterance.text);
        }

        fn cancel(&self) {}
    }

    fn dashboard_with(backend: Arc<ScriptedBackend>, speech: Arc<SpokenLog>) -> Dashboard {
        Dashboard::new(&RuntimeConfig::default(), backend, Arc::new(StillSource), speech)
    }

    fn dashboard(backend: Arc<ScriptedBackend>) -> Dashboard {
        dashboard_with(backend, Arc::new(SpokenLog::default()))
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_code_is_reported_once() {
        let backend = Arc::new(ScriptedBackend::default());
        backend.queue(analysis(Some("aaa"), 8.0, 2));
        backend.queue(analysis(Some("aaa"), 8.0, 2));
        backend.queue(analysis(Some("bbb"), 6.5, 1));
        let dashboard = dashboard(backend);
        let mut events = dashboard.subscribe();

        dashboard.start_capture().await.unwrap();
        assert!(matches!(events.recv().await.unwrap(), DashboardEvent::CaptureStarted));

        for _ in 0..3 {
            assert_eq!(dashboard.capture_now().await.unwrap(), CaptureOutcome::Dispatched);
            settle().await;
        }

        let transcript = dashboard.transcript();
        assert_eq!(transcript.len(), 2);
        assert!(transcript.iter().all(|t| t.role == Role::Assistant));
        assert_eq!(transcript[0].content, "review of Some(\"aaa\")");

        let stats = dashboard.stats();
        assert_eq!(stats.suggestions, 3);
        assert_eq!(stats.code_quality, 6.5);
        assert_eq!(stats.health_score, 10.0);

        assert!(events.recv().await.unwrap().turn().is_some());
        assert!(matches!(
            events.recv().await.unwrap(),
            DashboardEvent::AnalysisSuppressed { fingerprint: Some(_) }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_screen_never_appends() {
        let backend = Arc::new(ScriptedBackend::default());
        for _ in 0..3 {
            backend.queue(analysis(None, 0.0, 0));
        }
        let dashboard = dashboard(backend);
        dashboard.start_capture().await.unwrap();

        // Three automatic ticks.
        tokio::time::sleep(Duration::from_millis(9100)).await;
        assert!(dashboard.transcript().is_empty());
        assert_eq!(dashboard.stats().code_quality, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_analysis_failure_emits_event() {
        let backend = Arc::new(ScriptedBackend::default());
        backend.queue(Err(RuntimeError::Transport("down".to_string())));
        backend.queue(Ok(AnalyzeEnvelope {
            success: false,
            analysis: None,
            error: Some("No image data provided".to_string()),
        }));
        let dashboard = dashboard(backend);
        let mut events = dashboard.subscribe();
        dashboard.start_capture().await.unwrap();

        dashboard.capture_now().await.unwrap();
        settle().await;
        dashboard.capture_now().await.unwrap();
        settle().await;

        assert!(matches!(events.recv().await.unwrap(), DashboardEvent::CaptureStarted));
        assert!(events.recv().await.unwrap().is_error());
        match events.recv().await.unwrap() {
            DashboardEvent::AnalysisFailed { error } => assert_eq!(error, "No image data provided"),
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(dashboard.transcript().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_analysis_after_stop_still_lands() {
        let backend = Arc::new(ScriptedBackend::default());
        backend.queue(analysis(Some("aaa"), 9.0, 0));
        let dashboard = dashboard(backend);
        let mut events = dashboard.subscribe();
        dashboard.start_capture().await.unwrap();

        dashboard.capture_now().await.unwrap();
        assert!(dashboard.stop_capture());
        assert!(!dashboard.stop_capture());
        settle().await;

        assert_eq!(dashboard.transcript().len(), 1);
        assert!(matches!(events.recv().await.unwrap(), DashboardEvent::CaptureStarted));
        assert!(matches!(events.recv().await.unwrap(), DashboardEvent::CaptureStopped));
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_message_appends_user_then_assistant() {
        let backend = Arc::new(ScriptedBackend::default());
        let dashboard = dashboard(backend.clone());

        let reply = dashboard.send_message("  what is a closure?  ").await.unwrap();
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.content, "A closure captures its environment.");

        let reply = dashboard
            .send_message("review this code: function f(){ return 1 }")
            .await
            .unwrap();
        assert_eq!(reply.content, "Found 1 issue.");

        let transcript = dashboard.transcript();
        assert_eq!(transcript.len(), 4);
        assert_eq!(transcript[0].content, "what is a closure?");
        assert_eq!(transcript[0].role, Role::User);
        assert_eq!(transcript[2].role, Role::User);

        // History excludes the new user turn.
        let histories = backend.histories.lock().unwrap();
        assert!(histories[0].is_empty());
        assert_eq!(histories[1].len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_user_turn_is_visible_before_reply() {
        let backend = Arc::new(ScriptedBackend {
            chat_delay: Duration::from_secs(5),
            ..Default::default()
        });
        let dashboard = Arc::new(dashboard(backend));
        let mut events = dashboard.subscribe();

        let pending = tokio::spawn({
            let dashboard = dashboard.clone();
            async move { dashboard.send_message("hello").await }
        });
        settle().await;

        assert_eq!(dashboard.transcript().len(), 1);
        assert_eq!(events.recv().await.unwrap().turn().unwrap().role, Role::User);
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));

        pending.await.unwrap();
        assert_eq!(dashboard.transcript().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_history_window() {
        let backend = Arc::new(ScriptedBackend::default());
        let dashboard = dashboard(backend.clone());
        for i in 0..4 {
            dashboard.send_message(&format!("question {}", i)).await;
        }
        let histories = backend.histories.lock().unwrap();
        assert_eq!(histories[3].len(), 5);
        assert_eq!(histories[3][4].role, Role::Assistant);
        assert_eq!(histories[3][0].content, "A closure captures its environment.");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_chat_still_yields_one_reply() {
        let dashboard = dashboard(Arc::new(ScriptedBackend::default()));

        let reply = dashboard.send_message("offline").await.unwrap();
        assert_eq!(reply.content, NETWORK_ERROR_REPLY);

        let reply = dashboard.send_message("refuse").await.unwrap();
        assert_eq!(reply.content, NO_RESPONSE_REPLY);

        assert!(dashboard.send_message("   ").await.is_none());
        assert_eq!(dashboard.transcript().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_voice_narrates_only_when_enabled() {
        let backend = Arc::new(ScriptedBackend::default());
        let spoken = Arc::new(SpokenLog::default());
        let dashboard = dashboard_with(backend, spoken.clone());

        assert!(dashboard.is_muted());
        dashboard.send_message("hi").await;
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(spoken.0.lock().unwrap().is_empty());

        assert!(dashboard.toggle_voice());
        dashboard.send_message("hi again").await;
        dashboard.send_message("offline").await;
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(
            *spoken.0.lock().unwrap(),
            vec!["A closure captures its environment.".to_string()]
        );

        dashboard.set_muted(true);
        assert!(dashboard.is_muted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_time_advances() {
        let dashboard = dashboard(Arc::new(ScriptedBackend::default()));
        assert_eq!(dashboard.stats().session_time, 0);
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(dashboard.stats().session_time, 61);
    }
}
