//! Frame data structures for captured label photographs

use image::{Rgb, RgbImage};
use std::path::Path;
use thiserror::Error;

/// Errors building a frame from raw or encoded pixel data
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("pixel buffer has {actual} bytes, expected {expected} for {width}x{height}")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// A decoded photograph ready for analysis
#[derive(Debug, Clone)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    /// Wrap an already decoded RGB image
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    /// Create a frame from packed RGB bytes
    pub fn from_rgb(data: Vec<u8>, width: u32, height: u32) -> Result<Self, FrameError> {
        let expected = width as usize * height as usize * 3;
        let actual = data.len();
        let image = RgbImage::from_raw(width, height, data).ok_or(FrameError::BufferSize {
            width,
            height,
            expected,
            actual,
        })?;
        Ok(Self { image })
    }

    /// Create a frame from packed RGBA bytes, dropping alpha
    pub fn from_rgba(data: &[u8], width: u32, height: u32) -> Result<Self, FrameError> {
        Self::from_four_channel(data, width, height, [0, 1, 2])
    }

    /// Create a frame from packed BGRA bytes (common for camera and screen buffers)
    pub fn from_bgra(data: &[u8], width: u32, height: u32) -> Result<Self, FrameError> {
        Self::from_four_channel(data, width, height, [2, 1, 0])
    }

    fn from_four_channel(
        data: &[u8],
        width: u32,
        height: u32,
        order: [usize; 3],
    ) -> Result<Self, FrameError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(FrameError::BufferSize {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }

        let rgb = data
            .chunks_exact(4)
            .flat_map(|px| [px[order[0]], px[order[1]], px[order[2]]])
            .collect();
        Self::from_rgb(rgb, width, height)
    }

    /// Decode an image file
    pub fn open(path: &Path) -> Result<Self, FrameError> {
        let image = image::open(path)?.to_rgb8();
        Ok(Self { image })
    }

    /// Get frame dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// RGB triple at the given pixel
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let Rgb(px) = *self.image.get_pixel(x, y);
        px
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgb_size_mismatch() {
        let err = Frame::from_rgb(vec![0; 5], 2, 2).unwrap_err();
        assert!(matches!(err, FrameError::BufferSize { expected: 12, actual: 5, .. }));
    }

    #[test]
    fn test_from_bgra_swaps_channels() {
        let data = vec![
            255, 0, 0, 255, // Blue
            0, 0, 255, 255, // Red
        ];

        let frame = Frame::from_bgra(&data, 2, 1).unwrap();
        assert_eq!(frame.pixel(0, 0), [0, 0, 255]);
        assert_eq!(frame.pixel(1, 0), [255, 0, 0]);
    }

    #[test]
    fn test_from_rgba_drops_alpha() {
        let data = vec![10, 20, 30, 0];
        let frame = Frame::from_rgba(&data, 1, 1).unwrap();
        assert_eq!(frame.pixel(0, 0), [10, 20, 30]);
        assert_eq!(frame.dimensions(), (1, 1));
    }
}
