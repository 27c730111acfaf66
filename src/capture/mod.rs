//! Image Acquisition Layer
//!
//! Decodes label photographs and scales them down before analysis.
//! The analysis core only ever sees an owned RGB buffer.

pub mod frame;

pub use frame::{Frame, FrameError};

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Image acquisition configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Longest side after downscaling; `None` keeps the original size
    pub max_dimension: Option<u32>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            max_dimension: Some(1920),
        }
    }
}

/// Decode a photograph and downscale it to the configured size
pub fn load_frame(path: &Path, config: &CaptureConfig) -> Result<Frame, FrameError> {
    let frame = Frame::open(path)?;
    let (width, height) = frame.dimensions();
    info!("Loaded {:?} ({}x{})", path, width, height);

    Ok(match config.max_dimension {
        Some(max) => downscale(frame, max),
        None => frame,
    })
}

/// Scale a frame so its longest side is at most `max_dimension`
pub fn downscale(frame: Frame, max_dimension: u32) -> Frame {
    let (width, height) = frame.dimensions();
    let longest = width.max(height);
    if longest <= max_dimension || max_dimension == 0 {
        return frame;
    }

    let scale = max_dimension as f32 / longest as f32;
    let new_w = ((width as f32 * scale) as u32).max(1);
    let new_h = ((height as f32 * scale) as u32).max(1);
    debug!("Downscaling {}x{} -> {}x{}", width, height, new_w, new_h);

    let resized = image::imageops::resize(frame.image(), new_w, new_h, FilterType::Triangle);
    Frame::new(resized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_downscale_keeps_aspect_ratio() {
        let frame = Frame::new(RgbImage::from_pixel(400, 200, Rgb([255, 255, 255])));
        let scaled = downscale(frame, 100);
        assert_eq!(scaled.dimensions(), (100, 50));
    }

    #[test]
    fn test_downscale_noop_for_small_frames() {
        let frame = Frame::new(RgbImage::from_pixel(80, 60, Rgb([0, 0, 0])));
        let scaled = downscale(frame, 100);
        assert_eq!(scaled.dimensions(), (80, 60));
    }
}
