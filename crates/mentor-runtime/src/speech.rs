//! Spoken feedback.
//!
//! `SpeechAnnouncer` keeps at most one utterance live: every announcement
//! cancels whatever is playing, waits briefly for the engine to settle and
//! then speaks, unless a newer announcement or a mute arrived meanwhile.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::config::VoiceSettings;

/// One thing to say.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Utterance {
    pub fn new(text: impl Into<String>, voice: VoiceSettings) -> Self {
        Self {
            text: text.into(),
            rate: voice.rate,
            pitch: voice.pitch,
            volume: voice.volume,
        }
    }
}

/// A platform text-to-speech engine.
pub trait SpeechEngine: Send + Sync {
    fn speak(&self, utterance: Utterance);

    /// Stops anything currently being spoken.
    fn cancel(&self);
}

/// Discards all speech.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSpeech;

impl SpeechEngine for NullSpeech {
    fn speak(&self, _utterance: Utterance) {}

    fn cancel(&self) {}
}

/// Prints narration to the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSpeech;

impl SpeechEngine for ConsoleSpeech {
    fn speak(&self, utterance: Utterance) {
        println!("🔊 {}", utterance.text);
    }

    fn cancel(&self) {}
}

pub struct SpeechAnnouncer {
    engine: Arc<dyn SpeechEngine>,
    voice: VoiceSettings,
    cancel_delay: Duration,
    muted: AtomicBool,
    /// Bumped by every announcement and mute; a pending utterance only
    /// plays if the generation it saw is still current.
    generation: AtomicU64,
}

impl SpeechAnnouncer {
    /// Starts muted.
    pub fn new(
        engine: Arc<dyn SpeechEngine>,
        voice: VoiceSettings,
        cancel_delay: Duration,
    ) -> Self {
        Self {
            engine,
            voice,
            cancel_delay,
            muted: AtomicBool::new(true),
            generation: AtomicU64::new(0),
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::Acquire)
    }

    /// Muting silences the engine immediately.
    pub fn set_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::Release);
        if muted {
            self.generation.fetch_add(1, Ordering::AcqRel);
            self.engine.cancel();
        }
        debug!(muted, "Voice toggled");
    }

    /// Flips the mute state. Returns true if voice is now enabled.
    pub fn toggle(&self) -> bool {
        let enable = self.is_muted();
        self.set_muted(!enable);
        enable
    }

    /// Speaks `text`, superseding any earlier announcement. Returns whether
    /// the text was handed to the engine.
    pub async fn announce(&self, text: &str) -> bool {
        if self.is_muted() || text.trim().is_empty() {
            return false;
        }
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.engine.cancel();

        tokio::time::sleep(self.cancel_delay).await;

        if self.is_muted() || self.generation.load(Ordering::Acquire) != generation {
            trace!("Announcement superseded");
            return false;
        }
        self.engine.speak(Utterance::new(text, self.voice));
        true
    }
}
