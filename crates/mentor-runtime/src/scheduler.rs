//! Capture scheduler.
//!
//! While recording, a ticker samples the stream every `capture_interval`
//! and hands the encoded frame to a `FrameSink`. At most one frame is in
//! flight: ticks and manual captures that arrive while the sink is still
//! busy are dropped.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::config::MIN_CAPTURE_INTERVAL;
use crate::error::{Result, RuntimeError};
use crate::frame::FrameEncoder;
use crate::source::{CaptureStream, FrameSource};

/// Receives encoded frames and capture lifecycle notifications.
#[async_trait]
pub trait FrameSink: Send + Sync {
    async fn on_frame(&self, jpeg_b64: String);

    fn on_capture_started(&self) {}

    fn on_capture_stopped(&self) {}
}

/// Result of a capture attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// A frame was encoded and handed to the sink.
    Dispatched,
    /// A previous frame is still being analysed.
    Busy,
    /// The stream had nothing to encode.
    NotReady,
}

struct Session {
    id: u64,
    stream: Arc<dyn CaptureStream>,
    shutdown: watch::Sender<bool>,
}

struct Inner {
    source: Arc<dyn FrameSource>,
    sink: Arc<dyn FrameSink>,
    encoder: FrameEncoder,
    interval: Duration,
    session: Mutex<Option<Session>>,
    /// Serializes `start` so two callers cannot both open a stream.
    start_lock: tokio::sync::Mutex<()>,
    in_flight: AtomicBool,
    next_session: AtomicU64,
}

/// Clears the single-flight flag when the dispatch finishes, even if the
/// sink panics.
struct FlightGuard(Arc<Inner>);

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.0.in_flight.store(false, Ordering::Release);
    }
}

impl Inner {
    fn current_stream(&self) -> Option<Arc<dyn CaptureStream>> {
        let session = self.session.lock().unwrap_or_else(|e| e.into_inner());
        session.as_ref().map(|s| Arc::clone(&s.stream))
    }

    async fn capture(self: &Arc<Self>, stream: Arc<dyn CaptureStream>) -> CaptureOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            trace!("Analysis in flight, skipping capture");
            return CaptureOutcome::Busy;
        }
        let guard = FlightGuard(Arc::clone(self));

        // Reading and decoding a full-screen image is blocking work.
        let encoder = self.encoder;
        let sampled =
            tokio::task::spawn_blocking(move || sample_and_encode(stream.as_ref(), &encoder)).await;
        let encoded = match sampled {
            Ok(Some(encoded)) => encoded,
            Ok(None) => return CaptureOutcome::NotReady,
            Err(e) => {
                warn!(error = %e, "Capture task failed");
                return CaptureOutcome::NotReady;
            }
        };

        debug!(bytes = encoded.len(), "Dispatching frame");
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            let _guard = guard;
            sink.on_frame(encoded).await;
        });
        CaptureOutcome::Dispatched
    }

    /// Ends the current session, or only session `id` when given.
    fn stop_session(&self, id: Option<u64>) -> bool {
        let session = {
            let mut current = self.session.lock().unwrap_or_else(|e| e.into_inner());
            match current.as_ref() {
                Some(s) if id.map_or(true, |id| id == s.id) => current.take(),
                _ => None,
            }
        };
        let Some(session) = session else {
            return false;
        };

        let _ = session.shutdown.send(true);
        session.stream.release();
        info!(session = session.id, "Capture stopped");
        self.sink.on_capture_stopped();
        true
    }
}

/// Samples `stream` and encodes the frame; `None` when there is nothing
/// to dispatch.
fn sample_and_encode(stream: &dyn CaptureStream, encoder: &FrameEncoder) -> Option<String> {
    let frame = match stream.sample() {
        Ok(Some(frame)) => frame,
        Ok(None) => return None,
        Err(e) => {
            warn!(error = %e, "Failed to sample frame");
            return None;
        }
    };
    match encoder.encode(&frame) {
        Ok(Some(encoded)) => Some(encoded),
        Ok(None) => {
            trace!("Stream not ready, skipping capture");
            None
        }
        Err(e) => {
            warn!(error = %e, "Failed to encode frame");
            None
        }
    }
}

async fn run_ticker(
    inner: Arc<Inner>,
    stream: Arc<dyn CaptureStream>,
    mut shutdown: watch::Receiver<bool>,
) {
    let period = inner.interval;
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                inner.capture(Arc::clone(&stream)).await;
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
    trace!("Capture ticker stopped");
}

async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

async fn watch_stream(
    inner: Arc<Inner>,
    stream: Arc<dyn CaptureStream>,
    id: u64,
    mut shutdown: watch::Receiver<bool>,
) {
    tokio::select! {
        _ = stream.ended() => {
            debug!(session = id, "Capture stream ended");
            inner.stop_session(Some(id));
        }
        _ = shutdown_requested(&mut shutdown) => {}
    }
}

/// Drives periodic and manual captures for one frame source.
pub struct CaptureScheduler {
    inner: Arc<Inner>,
}

impl CaptureScheduler {
    /// Intervals below [`MIN_CAPTURE_INTERVAL`] are raised to it.
    pub fn new(
        source: Arc<dyn FrameSource>,
        sink: Arc<dyn FrameSink>,
        encoder: FrameEncoder,
        interval: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                sink,
                encoder,
                interval: interval.max(MIN_CAPTURE_INTERVAL),
                session: Mutex::new(None),
                start_lock: tokio::sync::Mutex::new(()),
                in_flight: AtomicBool::new(false),
                next_session: AtomicU64::new(0),
            }),
        }
    }

    /// Opens the stream and starts the ticker. The first automatic capture
    /// happens one interval after start.
    ///
    /// Returns `Ok(false)` if already recording; no second ticker is created.
    pub async fn start(&self) -> Result<bool> {
        let _starting = self.inner.start_lock.lock().await;
        if self.is_recording() {
            debug!("Capture already running");
            return Ok(false);
        }

        let stream = self.inner.source.open().await?;
        let id = self.inner.next_session.fetch_add(1, Ordering::Relaxed) + 1;
        let (shutdown, shutdown_rx) = watch::channel(false);

        {
            let mut session = self.inner.session.lock().unwrap_or_else(|e| e.into_inner());
            *session = Some(Session {
                id,
                stream: Arc::clone(&stream),
                shutdown,
            });
        }

        tokio::spawn(run_ticker(
            Arc::clone(&self.inner),
            Arc::clone(&stream),
            shutdown_rx.clone(),
        ));
        tokio::spawn(watch_stream(Arc::clone(&self.inner), stream, id, shutdown_rx));

        info!(
            session = id,
            interval_ms = self.inner.interval.as_millis() as u64,
            "Capture started"
        );
        self.inner.sink.on_capture_started();
        Ok(true)
    }

    /// Captures immediately, subject to the single-flight rule.
    pub async fn capture_now(&self) -> Result<CaptureOutcome> {
        let stream = self.inner.current_stream().ok_or(RuntimeError::NotRecording)?;
        Ok(self.inner.capture(stream).await)
    }

    /// Releases the stream and stops the ticker. Returns false if idle.
    ///
    /// A frame already handed to the sink is not cancelled.
    pub fn stop(&self) -> bool {
        self.inner.stop_session(None)
    }

    pub fn is_recording(&self) -> bool {
        self.inner
            .session
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Whether a frame is currently being analysed.
    pub fn is_busy(&self) -> bool {
        self.inner.in_flight.load(Ordering::Acquire)
    }
}

impl Drop for CaptureScheduler {
    fn drop(&mut self) {
        self.inner.stop_session(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use std::sync::atomic::AtomicUsize;

    struct FakeStream {
        frame: Frame,
        ended: watch::Sender<bool>,
        released: AtomicBool,
    }

    #[async_trait]
    impl CaptureStream for FakeStream {
        fn sample(&self) -> Result<Option<Frame>> {
            Ok(Some(self.frame.clone()))
        }

        async fn ended(&self) {
            let mut rx = self.ended.subscribe();
            while !*rx.borrow_and_update() {
                if rx.changed().await.is_err() {
                    return;
                }
            }
        }

        fn release(&self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    struct FakeSource {
        stream: Arc<FakeStream>,
        deny: bool,
        opened: AtomicUsize,
    }

    impl FakeSource {
        fn new(frame: Frame) -> Arc<Self> {
            let (ended, _) = watch::channel(false);
            Arc::new(Self {
                stream: Arc::new(FakeStream {
                    frame,
                    ended,
                    released: AtomicBool::new(false),
                }),
                deny: false,
                opened: AtomicUsize::new(0),
            })
        }

        fn denied() -> Arc<Self> {
            let (ended, _) = watch::channel(false);
            Arc::new(Self {
                stream: Arc::new(FakeStream {
                    frame: Frame::new(0, 0, Vec::new()),
                    ended,
                    released: AtomicBool::new(false),
                }),
                deny: true,
                opened: AtomicUsize::new(0),
            })
        }

        fn end_stream(&self) {
            self.stream.ended.send_replace(true);
        }
    }

    #[async_trait]
    impl FrameSource for FakeSource {
        async fn open(&self) -> Result<Arc<dyn CaptureStream>> {
            if self.deny {
                return Err(RuntimeError::CaptureDenied("permission dismissed".to_string()));
            }
            self.opened.fetch_add(1, Ordering::SeqCst);
            Ok(self.stream.clone())
        }
    }

    /// Records frames once the simulated analysis completes.
    struct SlowSink {
        delay: Duration,
        frames: AtomicUsize,
        started: AtomicUsize,
        stopped: AtomicUsize,
    }

    impl SlowSink {
        fn new(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                delay,
                frames: AtomicUsize::new(0),
                started: AtomicUsize::new(0),
                stopped: AtomicUsize::new(0),
            })
        }

        fn frames(&self) -> usize {
            self.frames.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FrameSink for SlowSink {
        async fn on_frame(&self, _jpeg_b64: String) {
            tokio::time::sleep(self.delay).await;
            self.frames.fetch_add(1, Ordering::SeqCst);
        }

        fn on_capture_started(&self) {
            self.started.fetch_add(1, Ordering::SeqCst);
        }

        fn on_capture_stopped(&self) {
            self.stopped.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn frame() -> Frame {
        Frame::new(2, 2, vec![10; 12])
    }

    fn scheduler(source: Arc<FakeSource>, sink: Arc<SlowSink>) -> CaptureScheduler {
        CaptureScheduler::new(source, sink, FrameEncoder::default(), Duration::from_secs(3))
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_on_interval() {
        let sink = SlowSink::new(Duration::ZERO);
        let scheduler = scheduler(FakeSource::new(frame()), sink.clone());

        assert!(scheduler.start().await.unwrap());
        assert!(scheduler.is_recording());

        tokio::time::sleep(Duration::from_millis(2900)).await;
        assert_eq!(sink.frames(), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(sink.frames(), 1);

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(sink.frames(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_start_does_not_add_ticker() {
        let source = FakeSource::new(frame());
        let sink = SlowSink::new(Duration::ZERO);
        let scheduler = scheduler(source.clone(), sink.clone());

        assert!(scheduler.start().await.unwrap());
        assert!(!scheduler.start().await.unwrap());
        assert_eq!(source.opened.load(Ordering::SeqCst), 1);
        assert_eq!(sink.started.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(3100)).await;
        assert_eq!(sink.frames(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent() {
        let source = FakeSource::new(frame());
        let sink = SlowSink::new(Duration::ZERO);
        let scheduler = scheduler(source.clone(), sink.clone());

        assert!(!scheduler.stop());

        scheduler.start().await.unwrap();
        assert!(scheduler.stop());
        assert!(!scheduler.stop());
        assert!(!scheduler.is_recording());
        assert!(source.stream.released.load(Ordering::SeqCst));
        assert_eq!(sink.stopped.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(sink.frames(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_now_requires_recording() {
        let scheduler = scheduler(FakeSource::new(frame()), SlowSink::new(Duration::ZERO));
        assert!(matches!(scheduler.capture_now().await, Err(RuntimeError::NotRecording)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_flight() {
        let sink = SlowSink::new(Duration::from_secs(10));
        let scheduler = scheduler(FakeSource::new(frame()), sink.clone());
        scheduler.start().await.unwrap();

        assert_eq!(scheduler.capture_now().await.unwrap(), CaptureOutcome::Dispatched);
        assert!(scheduler.is_busy());
        assert_eq!(scheduler.capture_now().await.unwrap(), CaptureOutcome::Busy);

        // Ticks at 3s, 6s and 9s all land while the first analysis runs.
        tokio::time::sleep(Duration::from_millis(9500)).await;
        assert_eq!(sink.frames(), 0);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(sink.frames(), 1);
        assert!(!scheduler.is_busy());
        assert_eq!(scheduler.capture_now().await.unwrap(), CaptureOutcome::Dispatched);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_frame_is_not_dispatched() {
        let sink = SlowSink::new(Duration::ZERO);
        let scheduler = scheduler(FakeSource::new(Frame::new(0, 0, Vec::new())), sink.clone());
        scheduler.start().await.unwrap();

        assert_eq!(scheduler.capture_now().await.unwrap(), CaptureOutcome::NotReady);
        assert!(!scheduler.is_busy());
        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(sink.frames(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_end_stops_capture() {
        let source = FakeSource::new(frame());
        let sink = SlowSink::new(Duration::ZERO);
        let scheduler = scheduler(source.clone(), sink.clone());
        scheduler.start().await.unwrap();

        source.end_stream();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(!scheduler.is_recording());
        assert_eq!(sink.stopped.load(Ordering::SeqCst), 1);
        assert!(!scheduler.stop());
    }

    #[tokio::test(start_paused = true)]
    async fn test_denied_start_stays_idle() {
        let sink = SlowSink::new(Duration::ZERO);
        let scheduler = scheduler(FakeSource::denied(), sink.clone());

        assert!(matches!(scheduler.start().await, Err(RuntimeError::CaptureDenied(_))));
        assert!(!scheduler.is_recording());
        assert_eq!(sink.started.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_still_ticks() {
        let sink = SlowSink::new(Duration::ZERO);
        let scheduler = CaptureScheduler::new(
            FakeSource::new(frame()),
            sink.clone(),
            FrameEncoder::default(),
            Duration::ZERO,
        );
        assert!(scheduler.start().await.unwrap());

        tokio::time::sleep(MIN_CAPTURE_INTERVAL * 3 + Duration::from_millis(50)).await;
        assert!(scheduler.is_recording());
        assert!(sink.frames() >= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_does_not_cancel_in_flight_frame() {
        let sink = SlowSink::new(Duration::from_secs(1));
        let scheduler = scheduler(FakeSource::new(frame()), sink.clone());
        scheduler.start().await.unwrap();

        assert_eq!(scheduler.capture_now().await.unwrap(), CaptureOutcome::Dispatched);
        scheduler.stop();

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(sink.frames(), 1);
    }
}
