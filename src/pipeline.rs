//! Analysis Pipeline
//!
//! Orchestrates label detection, text grouping and product extraction for one
//! frame. Grouping falls back through increasingly coarse strategies until one
//! of them yields products.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::analysis::grouping::GroupingStrategy;
use crate::analysis::{
    legacy, AnalysisResult, AnalysisStage, Cluster, ProductExtractor, ProductRecord,
    TextBlockGrouper,
};
use crate::capture::Frame;
use crate::config::AppConfig;
use crate::overlay::AnchorConfig;
use crate::vision::{Rect, TextBlock, TextRecognizer, WhiteLabelDetector};

/// Pipeline execution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Probe regions and extract clusters on the rayon thread pool
    pub parallel: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// Label analysis pipeline bound to one text recognizer
pub struct AnalysisPipeline {
    detector: WhiteLabelDetector,
    grouper: TextBlockGrouper,
    extractor: ProductExtractor,
    anchor: AnchorConfig,
    settings: PipelineSettings,
    recognizer: Arc<dyn TextRecognizer>,
}

impl AnalysisPipeline {
    pub fn new(config: &AppConfig, recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self {
            detector: WhiteLabelDetector::with_config(config.detection.clone()),
            grouper: TextBlockGrouper::with_config(config.grouping.clone()),
            extractor: ProductExtractor::with_anchor(config.overlay),
            anchor: config.overlay,
            settings: config.pipeline.clone(),
            recognizer,
        }
    }

    pub fn set_parallel(&mut self, parallel: bool) {
        self.settings.parallel = parallel;
    }

    /// Detect white label regions in a frame
    pub fn detect_regions(&self, frame: &Frame) -> Vec<Rect> {
        self.detector.detect(frame, self.settings.parallel)
    }

    /// Recognize text in a frame and analyze it
    pub async fn analyze_frame(&self, frame: &Frame) -> Option<AnalysisResult> {
        let regions = self.detect_regions(frame);
        let blocks = self.recognize(frame).await?;
        self.analyze_blocks(&blocks, &regions)
    }

    /// Run the text recognizer on a frame
    ///
    /// A recognizer failure is logged and reported as `None`; there is no retry.
    pub async fn recognize(&self, frame: &Frame) -> Option<Vec<TextBlock>> {
        match self.recognizer.recognize(frame).await {
            Ok(blocks) => Some(blocks),
            Err(e) => {
                warn!("Text recognition failed: {}", e);
                None
            }
        }
    }

    /// Analyze a frame with text blocks recognized elsewhere
    pub fn analyze(&self, frame: &Frame, blocks: &[TextBlock]) -> Option<AnalysisResult> {
        let regions = self.detect_regions(frame);
        self.analyze_blocks(blocks, &regions)
    }

    /// Run the grouping cascade over already detected regions
    pub fn analyze_blocks(
        &self,
        blocks: &[TextBlock],
        regions: &[Rect],
    ) -> Option<AnalysisResult> {
        let start = Instant::now();
        if blocks.is_empty() {
            info!("No text blocks to analyze");
            return None;
        }
        debug!("Analyzing {} blocks with {} label regions", blocks.len(), regions.len());

        let region_products = if regions.is_empty() {
            Vec::new()
        } else {
            self.run_stage(GroupingStrategy::RegionMembership, blocks, regions)
        };
        if region_products.len() >= self.grouper.config().min_region_products {
            return self.finish(region_products, AnalysisStage::Regions, start);
        }

        let products = self.run_stage(GroupingStrategy::Proximity, blocks, regions);
        if !products.is_empty() {
            return self.finish(products, AnalysisStage::Proximity, start);
        }

        let products = self.run_stage(GroupingStrategy::Columns, blocks, regions);
        if !products.is_empty() {
            return self.finish(products, AnalysisStage::Columns, start);
        }

        let text = blocks
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        if let Some(product) = legacy::parse_whole_text(&text, &self.anchor) {
            return self.finish(vec![product], AnalysisStage::Legacy, start);
        }

        if !region_products.is_empty() {
            return self.finish(region_products, AnalysisStage::Regions, start);
        }

        info!("No products found in {} blocks ({:?})", blocks.len(), start.elapsed());
        None
    }

    fn run_stage(
        &self,
        strategy: GroupingStrategy,
        blocks: &[TextBlock],
        regions: &[Rect],
    ) -> Vec<ProductRecord> {
        let clusters = self.grouper.group(strategy, blocks, regions);
        let products = self.extract_all(&clusters);
        debug!(
            "{:?} stage: {} clusters -> {} products",
            strategy,
            clusters.len(),
            products.len()
        );
        products
    }

    /// Extract every cluster, keeping cluster order
    fn extract_all(&self, clusters: &[Cluster<'_>]) -> Vec<ProductRecord> {
        let extract =
            |cluster: &Cluster<'_>| self.extractor.extract(&cluster.text(), Some(cluster.bounds()));

        if self.settings.parallel {
            clusters.par_iter().filter_map(extract).collect()
        } else {
            clusters.iter().filter_map(extract).collect()
        }
    }

    fn finish(
        &self,
        products: Vec<ProductRecord>,
        stage: AnalysisStage,
        start: Instant,
    ) -> Option<AnalysisResult> {
        let result = AnalysisResult::from_products(products, stage)?;
        info!(
            "Found {} products ({} deceptive) via {:?} in {:?}",
            result.count,
            result.deceptive().count(),
            stage,
            start.elapsed()
        );
        Some(result)
    }
}
