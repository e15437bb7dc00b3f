//! Frame sources.
//!
//! A `FrameSource` hands out a `CaptureStream` when capture starts. The
//! stream is sampled on every tick and reports when it has ended on its
//! own, for example because the user stopped sharing.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, trace};

use crate::error::{Result, RuntimeError};
use crate::frame::Frame;

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Acquires a live stream. Fails with `CaptureDenied` when capture is
    /// refused or impossible.
    async fn open(&self) -> Result<Arc<dyn CaptureStream>>;
}

#[async_trait]
pub trait CaptureStream: Send + Sync {
    /// The current frame, or `None` when nothing is available yet.
    fn sample(&self) -> Result<Option<Frame>>;

    /// Resolves once the stream has ended, externally or via `release`.
    async fn ended(&self);

    fn release(&self);
}

/// Treats a screenshot file, or the newest image in a directory, as the
/// shared screen. Removing the path ends the stream.
#[derive(Debug, Clone)]
pub struct ScreenshotFileSource {
    path: PathBuf,
    poll_interval: Duration,
}

impl ScreenshotFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            poll_interval: Duration::from_millis(500),
        }
    }

    /// How often the stream checks whether the path still exists.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl FrameSource for ScreenshotFileSource {
    async fn open(&self) -> Result<Arc<dyn CaptureStream>> {
        if !self.path.exists() {
            return Err(RuntimeError::CaptureDenied(format!(
                "{} does not exist",
                self.path.display()
            )));
        }
        debug!(path = %self.path.display(), "Screenshot stream opened");
        let (released, _) = watch::channel(false);
        Ok(Arc::new(ScreenshotStream {
            path: self.path.clone(),
            poll_interval: self.poll_interval,
            released,
        }))
    }
}

struct ScreenshotStream {
    path: PathBuf,
    poll_interval: Duration,
    released: watch::Sender<bool>,
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

/// Newest image file directly inside `dir`.
fn newest_image(dir: &Path) -> Result<Option<PathBuf>> {
    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || !is_image(&path) {
            continue;
        }
        let modified = path.metadata()?.modified()?;
        if newest.as_ref().map_or(true, |(time, _)| modified > *time) {
            newest = Some((modified, path));
        }
    }
    Ok(newest.map(|(_, path)| path))
}

#[async_trait]
impl CaptureStream for ScreenshotStream {
    fn sample(&self) -> Result<Option<Frame>> {
        let file = if self.path.is_dir() {
            match newest_image(&self.path)? {
                Some(file) => file,
                None => return Ok(None),
            }
        } else {
            self.path.clone()
        };

        trace!(file = %file.display(), "Sampling screenshot");
        let bytes = std::fs::read(&file)?;
        let image =
            image::load_from_memory(&bytes).map_err(|e| RuntimeError::Encode(e.to_string()))?;
        Ok(Some(Frame::from_image(&image)))
    }

    async fn ended(&self) {
        let mut released = self.released.subscribe();
        loop {
            if *released.borrow() || !self.path.exists() {
                return;
            }
            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                changed = released.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
            }
        }
    }

    fn release(&self) {
        self.released.send_replace(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat};
    use tempfile::tempdir;

    fn write_png(path: &Path, width: u32, height: u32) {
        DynamicImage::new_rgb8(width, height)
            .save_with_format(path, ImageFormat::Png)
            .unwrap();
    }

    #[tokio::test]
    async fn test_open_missing_path_is_denied() {
        let dir = tempdir().unwrap();
        let source = ScreenshotFileSource::new(dir.path().join("nope.png"));
        assert!(matches!(source.open().await, Err(RuntimeError::CaptureDenied(_))));
    }

    #[tokio::test]
    async fn test_sample_single_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("screen.png");
        write_png(&file, 4, 3);

        let stream = ScreenshotFileSource::new(&file).open().await.unwrap();
        let frame = stream.sample().unwrap().unwrap();
        assert_eq!((frame.width, frame.height), (4, 3));
    }

    #[tokio::test]
    async fn test_sample_directory_picks_newest_image() {
        let dir = tempdir().unwrap();
        let stream = ScreenshotFileSource::new(dir.path()).open().await.unwrap();
        assert!(stream.sample().unwrap().is_none());

        write_png(&dir.path().join("old.png"), 2, 2);
        std::fs::write(dir.path().join("notes.txt"), "not an image").unwrap();
        std::thread::sleep(Duration::from_millis(20));
        write_png(&dir.path().join("new.png"), 5, 1);

        let frame = stream.sample().unwrap().unwrap();
        assert_eq!((frame.width, frame.height), (5, 1));
    }

    #[tokio::test]
    async fn test_stream_ends_when_path_removed() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("screen.png");
        write_png(&file, 1, 1);

        let source = ScreenshotFileSource::new(&file).with_poll_interval(Duration::from_millis(10));
        let stream = source.open().await.unwrap();
        std::fs::remove_file(&file).unwrap();

        tokio::time::timeout(Duration::from_secs(2), stream.ended())
            .await
            .expect("stream should end once the file is gone");
    }

    #[tokio::test]
    async fn test_release_ends_stream() {
        let dir = tempdir().unwrap();
        let stream = ScreenshotFileSource::new(dir.path()).open().await.unwrap();
        stream.release();
        tokio::time::timeout(Duration::from_secs(1), stream.ended())
            .await
            .expect("released stream should end");
    }

    #[test]
    fn test_is_image() {
        assert!(is_image(Path::new("a/shot.PNG")));
        assert!(is_image(Path::new("shot.jpeg")));
        assert!(!is_image(Path::new("shot.gif")));
        assert!(!is_image(Path::new("README")));
    }
}
