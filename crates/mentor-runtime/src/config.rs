//! Runtime configuration.

use std::time::Duration;

/// Default backend address, matching the server's default bind.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// Shortest period the capture ticker accepts.
pub const MIN_CAPTURE_INTERVAL: Duration = Duration::from_millis(100);

/// Voice parameters for spoken feedback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceSettings {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            rate: 0.9,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

/// Configuration for the client runtime.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Period between automatic captures.
    pub capture_interval: Duration,
    /// JPEG quality, 1-100.
    pub jpeg_quality: u8,
    /// Pause between cancelling speech and starting the next utterance.
    pub speech_cancel_delay: Duration,
    pub voice: VoiceSettings,
    /// Chat turns sent as context with each message.
    pub history_window: usize,
    /// Base URL of the HackMentor API.
    pub server_url: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            capture_interval: Duration::from_secs(3),
            jpeg_quality: 80,
            speech_cancel_delay: Duration::from_millis(100),
            voice: VoiceSettings::default(),
            history_window: 5,
            server_url: DEFAULT_SERVER_URL.to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the capture period, raised to at least [`MIN_CAPTURE_INTERVAL`].
    pub fn with_capture_interval(mut self, interval: Duration) -> Self {
        self.capture_interval = interval.max(MIN_CAPTURE_INTERVAL);
        self
    }

    /// Sets the JPEG quality, clamped to 1-100.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn with_speech_cancel_delay(mut self, delay: Duration) -> Self {
        self.speech_cancel_delay = delay;
        self
    }

    pub fn with_voice(mut self, voice: VoiceSettings) -> Self {
        self.voice = voice;
        self
    }

    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RuntimeConfig::default();

        assert_eq!(config.capture_interval, Duration::from_secs(3));
        assert_eq!(config.jpeg_quality, 80);
        assert_eq!(config.speech_cancel_delay, Duration::from_millis(100));
        assert_eq!(config.voice.rate, 0.9);
        assert_eq!(config.history_window, 5);
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
    }

    #[test]
    fn test_config_builder() {
        let config = RuntimeConfig::new()
            .with_capture_interval(Duration::from_millis(500))
            .with_jpeg_quality(0)
            .with_history_window(2)
            .with_server_url("http://mentor.local:8080/");

        assert_eq!(config.capture_interval, Duration::from_millis(500));
        assert_eq!(config.jpeg_quality, 1);
        assert_eq!(config.history_window, 2);
        assert_eq!(config.server_url, "http://mentor.local:8080");
    }

    #[test]
    fn test_zero_capture_interval_is_raised() {
        let config = RuntimeConfig::new().with_capture_interval(Duration::ZERO);
        assert_eq!(config.capture_interval, MIN_CAPTURE_INTERVAL);
    }
}
