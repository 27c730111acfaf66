//! shelf-price - Shelf price label analysis
//!
//! Turns photographs of supermarket shelf labels into structured product-price
//! records and flags labels whose displayed price hides a higher per-kilogram
//! price.

pub mod analysis;
pub mod capture;
pub mod config;
pub mod overlay;
pub mod pipeline;
pub mod vision;

pub use analysis::{AnalysisResult, AnalysisStage, ProductExtractor, ProductRecord};
pub use capture::Frame;
pub use config::AppConfig;
pub use pipeline::AnalysisPipeline;
pub use vision::{Rect, TextBlock, TextRecognizer};
