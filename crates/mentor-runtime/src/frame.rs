//! Frames and the JPEG encoder.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;

use crate::error::{Result, RuntimeError};

/// A sampled RGB frame, 3 bytes per pixel, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn from_image(image: &DynamicImage) -> Self {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();
        Self::new(width, height, rgb.into_raw())
    }

    /// A stream that has not produced its first picture yet reports zero size.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Encodes frames as base64 JPEG at a fixed quality.
#[derive(Debug, Clone, Copy)]
pub struct FrameEncoder {
    quality: u8,
}

impl FrameEncoder {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Returns `None` for an empty frame; nothing should be dispatched.
    pub fn encode(&self, frame: &Frame) -> Result<Option<String>> {
        if frame.is_empty() {
            return Ok(None);
        }
        let expected = frame.width as usize * frame.height as usize * 3;
        if frame.pixels.len() != expected {
            return Err(RuntimeError::Encode(format!(
                "{}x{} frame has {} bytes, expected {}",
                frame.width,
                frame.height,
                frame.pixels.len(),
                expected
            )));
        }

        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, self.quality)
            .encode(
                &frame.pixels,
                frame.width,
                frame.height,
                image::ColorType::Rgb8.into(),
            )
            .map_err(|e| RuntimeError::Encode(e.to_string()))?;

        Ok(Some(BASE64.encode(jpeg)))
    }
}

impl Default for FrameEncoder {
    fn default() -> Self {
        Self::new(80)
    }
}
