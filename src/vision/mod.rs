//! Vision Layer
//!
//! Pixel-level label detection plus the boundary to the external text recognizer.

pub mod detection;
pub mod geometry;
pub mod ocr;

pub use detection::{merge_overlapping, DetectionConfig, WhiteLabelDetector};
pub use geometry::Rect;
pub use ocr::{
    parse_blocks, JsonBlockRecognizer, RecognitionError, StaticRecognizer, TextBlock,
    TextRecognizer,
};
