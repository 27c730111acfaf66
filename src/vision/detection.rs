//! White label region detection
//!
//! Finds the bright rectangular backgrounds the store prints its price labels on.
//! Fixed-size probes slide across the image; every mostly-white probe grows outward
//! until its edges stop being white, and overlapping survivors are merged.

use image::{GrayImage, Luma};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use super::geometry::Rect;
use crate::capture::Frame;

/// Configuration for white label detection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Side of the square probe in pixels (stride is half of it)
    pub block_size: u32,
    /// Mean RGB value a pixel must exceed to count as white
    pub brightness_threshold: u8,
    /// Fraction of white pixels a probe needs to seed a region
    pub block_white_fraction: f32,
    /// Fraction of white pixels an edge needs for the region to grow over it
    pub edge_white_fraction: f32,
    /// Exclusive width bounds of a plausible label
    pub min_width: i32,
    pub max_width: i32,
    /// Exclusive height bounds of a plausible label
    pub min_height: i32,
    pub max_height: i32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            block_size: 50,
            brightness_threshold: 200,
            block_white_fraction: 0.7,
            edge_white_fraction: 0.6,
            min_width: 80,
            max_width: 500,
            min_height: 60,
            max_height: 400,
        }
    }
}

/// Detector for white price-label backgrounds
#[derive(Debug, Clone, Default)]
pub struct WhiteLabelDetector {
    config: DetectionConfig,
}

impl WhiteLabelDetector {
    pub fn new() -> Self {
        Self::with_config(DetectionConfig::default())
    }

    pub fn with_config(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Find label regions in a frame
    ///
    /// Deterministic; the result does not depend on `parallel`.
    pub fn detect(&self, frame: &Frame, parallel: bool) -> Vec<Rect> {
        let start = Instant::now();
        let brightness = brightness_map(frame);
        let (width, height) = brightness.dimensions();
        let block = self.config.block_size.max(2);
        let stride = (block / 2).max(1);

        if width < block || height < block {
            return vec![];
        }

        let probes: Vec<(u32, u32)> = (0..=height - block)
            .step_by(stride as usize)
            .flat_map(|y| {
                (0..=width - block)
                    .step_by(stride as usize)
                    .map(move |x| (x, y))
            })
            .collect();

        let grow = |&(x, y): &(u32, u32)| -> Option<Rect> {
            let seed = Rect::new(x as i32, y as i32, (x + block) as i32, (y + block) as i32);
            if !self.is_white_block(&brightness, &seed) {
                return None;
            }
            let expanded = self.expand(&brightness, seed);
            self.is_valid_label_size(&expanded).then_some(expanded)
        };

        let candidates: Vec<Rect> = if parallel {
            probes.par_iter().filter_map(grow).collect()
        } else {
            probes.iter().filter_map(grow).collect()
        };

        let regions = merge_overlapping(candidates);
        debug!(
            "White label detection complete in {:?}: {} probes, {} regions",
            start.elapsed(),
            probes.len(),
            regions.len()
        );
        regions
    }

    fn is_bright(&self, brightness: &GrayImage, x: i32, y: i32) -> bool {
        brightness.get_pixel(x as u32, y as u32).0[0] > self.config.brightness_threshold
    }

    fn white_fraction(&self, brightness: &GrayImage, rect: &Rect) -> f32 {
        let total = rect.area();
        if total == 0 {
            return 0.0;
        }

        let mut white = 0i64;
        for y in rect.top..rect.bottom {
            for x in rect.left..rect.right {
                if self.is_bright(brightness, x, y) {
                    white += 1;
                }
            }
        }
        white as f32 / total as f32
    }

    fn is_white_block(&self, brightness: &GrayImage, rect: &Rect) -> bool {
        self.white_fraction(brightness, rect) > self.config.block_white_fraction
    }

    fn is_white_edge(&self, brightness: &GrayImage, edge: Rect) -> bool {
        self.white_fraction(brightness, &edge) > self.config.edge_white_fraction
    }

    /// Grow a seed left, right, up and down while the next column/row is mostly white
    fn expand(&self, brightness: &GrayImage, seed: Rect) -> Rect {
        let width = brightness.width() as i32;
        let height = brightness.height() as i32;
        let mut r = seed;

        while r.left > 0
            && self.is_white_edge(brightness, Rect::new(r.left - 1, r.top, r.left, r.bottom))
        {
            r.left -= 1;
        }
        while r.right < width
            && self.is_white_edge(brightness, Rect::new(r.right, r.top, r.right + 1, r.bottom))
        {
            r.right += 1;
        }
        while r.top > 0
            && self.is_white_edge(brightness, Rect::new(r.left, r.top - 1, r.right, r.top))
        {
            r.top -= 1;
        }
        while r.bottom < height
            && self.is_white_edge(brightness, Rect::new(r.left, r.bottom, r.right, r.bottom + 1))
        {
            r.bottom += 1;
        }

        r
    }

    fn is_valid_label_size(&self, region: &Rect) -> bool {
        let (w, h) = (region.width(), region.height());
        w > self.config.min_width
            && w < self.config.max_width
            && h > self.config.min_height
            && h < self.config.max_height
    }
}

/// Per-pixel mean of the RGB channels
fn brightness_map(frame: &Frame) -> GrayImage {
    let (width, height) = frame.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        let [r, g, b] = frame.pixel(x, y);
        Luma([((r as u16 + g as u16 + b as u16) / 3) as u8])
    })
}

/// Replace intersecting regions by their bounding union until none intersect
pub fn merge_overlapping(mut regions: Vec<Rect>) -> Vec<Rect> {
    loop {
        let mut merged_any = false;
        let mut merged: Vec<Rect> = Vec::with_capacity(regions.len());

        for region in regions {
            match merged.iter_mut().find(|existing| existing.intersects(&region)) {
                Some(existing) => {
                    *existing = existing.union(&region);
                    merged_any = true;
                }
                None => merged.push(region),
            }
        }

        if !merged_any {
            return merged;
        }
        regions = merged;
    }
}
