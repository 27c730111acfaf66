//! OCR (Optical Character Recognition) boundary
//!
//! Recognition itself is an external service. The analysis core only defines
//! the shape of its output ([`TextBlock`]) and a single-shot async call
//! ([`TextRecognizer::recognize`]) that either yields blocks or fails.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

use super::geometry::Rect;
use crate::capture::Frame;

/// One recognized region of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Recognized text, possibly spanning several lines
    pub text: String,
    /// Bounding box in image pixel coordinates
    #[serde(rename = "box")]
    pub bounds: Rect,
}

impl TextBlock {
    pub fn new(text: impl Into<String>, bounds: Rect) -> Self {
        Self {
            text: text.into(),
            bounds,
        }
    }
}

/// Failure reported by a text recognizer
#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("text recognizer failed: {0}")]
    Engine(String),
    #[error("failed to read OCR output {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed OCR output: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// An external text recognizer
///
/// Implementations are owned handles passed into the pipeline; there is no
/// process-wide client.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Recognize every text block in the frame
    async fn recognize(&self, frame: &Frame) -> Result<Vec<TextBlock>, RecognitionError>;
}

/// Recognizer that replays OCR output stored as JSON
///
/// The file holds an array of `{ "text": ..., "box": { "left", "top", "right", "bottom" } }`.
pub struct JsonBlockRecognizer {
    path: PathBuf,
}

impl JsonBlockRecognizer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Parse OCR blocks from a JSON document
pub fn parse_blocks(json: &str) -> Result<Vec<TextBlock>, RecognitionError> {
    Ok(serde_json::from_str(json)?)
}

#[async_trait]
impl TextRecognizer for JsonBlockRecognizer {
    async fn recognize(&self, _frame: &Frame) -> Result<Vec<TextBlock>, RecognitionError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| RecognitionError::Io {
                path: self.path.clone(),
                source,
            })?;

        let blocks = parse_blocks(&content)?;
        debug!("Loaded {} OCR blocks from {:?}", blocks.len(), self.path);
        Ok(blocks)
    }
}

/// Recognizer returning a fixed set of blocks
#[derive(Debug, Clone, Default)]
pub struct StaticRecognizer {
    blocks: Vec<TextBlock>,
}

impl StaticRecognizer {
    pub fn new(blocks: Vec<TextBlock>) -> Self {
        Self { blocks }
    }
}

#[async_trait]
impl TextRecognizer for StaticRecognizer {
    async fn recognize(&self, _frame: &Frame) -> Result<Vec<TextBlock>, RecognitionError> {
        Ok(self.blocks.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"[
        { "text": "Tomate pera", "box": { "left": 10, "top": 20, "right": 110, "bottom": 40 } },
        { "text": "2,19€/Kg", "box": { "left": 10, "top": 50, "right": 90, "bottom": 70 } }
    ]"#;

    fn blank_frame() -> Frame {
        Frame::new(RgbImage::from_pixel(4, 4, Rgb([0, 0, 0])))
    }

    #[test]
    fn test_parse_blocks() {
        let blocks = parse_blocks(SAMPLE).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text, "Tomate pera");
        assert_eq!(blocks[1].bounds, Rect::new(10, 50, 90, 70));
    }

    #[test]
    fn test_parse_blocks_malformed() {
        let result = parse_blocks("{ not json");
        assert!(matches!(result, Err(RecognitionError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_json_recognizer_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE).unwrap();

        let recognizer = JsonBlockRecognizer::new(file.path());
        let blocks = recognizer.recognize(&blank_frame()).await.unwrap();
        assert_eq!(blocks.len(), 2);
    }

    #[tokio::test]
    async fn test_json_recognizer_missing_file() {
        let recognizer = JsonBlockRecognizer::new("/nonexistent/blocks.json");
        let result = recognizer.recognize(&blank_frame()).await;
        assert!(matches!(result, Err(RecognitionError::Io { .. })));
    }
}
