//! Text block grouping
//!
//! Partitions recognized text blocks into per-product clusters. Three
//! alternative strategies exist; the pipeline decides which one to trust.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::vision::{Rect, TextBlock};

/// Configuration for text block grouping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    /// Share of a block's own area that must fall inside a label region
    pub region_overlap_ratio: f64,
    /// Maximum center distance from a cluster seed, in pixels (exclusive)
    pub proximity_distance: f64,
    /// Maximum center-x offset from a column seed, in pixels (exclusive)
    pub column_distance: i32,
    /// Records the region stage must yield before it is trusted
    pub min_region_products: usize,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            region_overlap_ratio: 0.3,
            proximity_distance: 200.0,
            column_distance: 150,
            min_region_products: 2,
        }
    }
}

/// Grouping strategy that produced a set of clusters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupingStrategy {
    RegionMembership,
    Proximity,
    Columns,
}

/// Text blocks judged to belong to one product listing
#[derive(Debug, Clone)]
pub struct Cluster<'a> {
    pub blocks: Vec<&'a TextBlock>,
}

impl<'a> Cluster<'a> {
    pub fn new(blocks: Vec<&'a TextBlock>) -> Self {
        Self { blocks }
    }

    /// Member texts joined by newlines, in member order
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Tight union of the member boxes
    pub fn bounds(&self) -> Rect {
        Rect::bounding(self.blocks.iter().map(|b| &b.bounds)).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Groups OCR text blocks into clusters
#[derive(Debug, Clone, Default)]
pub struct TextBlockGrouper {
    config: GroupingConfig,
}

impl TextBlockGrouper {
    pub fn new() -> Self {
        Self::with_config(GroupingConfig::default())
    }

    pub fn with_config(config: GroupingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GroupingConfig {
        &self.config
    }

    /// Cluster blocks with the given strategy
    pub fn group<'a>(
        &self,
        strategy: GroupingStrategy,
        blocks: &'a [TextBlock],
        regions: &[Rect],
    ) -> Vec<Cluster<'a>> {
        let clusters = match strategy {
            GroupingStrategy::RegionMembership => {
                let retained = self.blocks_in_regions(blocks, regions);
                self.cluster_by_proximity(retained)
            }
            GroupingStrategy::Proximity => self.cluster_by_proximity(blocks.iter().collect()),
            GroupingStrategy::Columns => self.by_columns(blocks),
        };

        debug!(
            "{:?} grouping: {} blocks -> {} clusters",
            strategy,
            blocks.len(),
            clusters.len()
        );
        clusters
    }

    /// Blocks lying mostly inside any detected label region
    pub fn blocks_in_regions<'a>(
        &self,
        blocks: &'a [TextBlock],
        regions: &[Rect],
    ) -> Vec<&'a TextBlock> {
        blocks
            .iter()
            .filter(|block| {
                let area = block.bounds.area();
                area > 0
                    && regions.iter().any(|region| {
                        block.bounds.intersection(region).is_some_and(|overlap| {
                            overlap.area() as f64 / area as f64 > self.config.region_overlap_ratio
                        })
                    })
            })
            .collect()
    }

    /// Greedy single-hop clustering around seed blocks
    pub fn by_proximity<'a>(&self, blocks: &'a [TextBlock]) -> Vec<Cluster<'a>> {
        self.cluster_by_proximity(blocks.iter().collect())
    }

    /// Only the seed-to-candidate distance is checked, so a chain of blocks
    /// each close to the next can still end up in separate clusters.
    fn cluster_by_proximity<'a>(&self, blocks: Vec<&'a TextBlock>) -> Vec<Cluster<'a>> {
        let mut visited = vec![false; blocks.len()];
        let mut clusters = Vec::new();

        for seed in 0..blocks.len() {
            if visited[seed] {
                continue;
            }
            visited[seed] = true;
            let mut members = vec![blocks[seed]];

            for candidate in (seed + 1)..blocks.len() {
                if visited[candidate] {
                    continue;
                }
                let distance = blocks[seed].bounds.center_distance(&blocks[candidate].bounds);
                if distance < self.config.proximity_distance {
                    visited[candidate] = true;
                    members.push(blocks[candidate]);
                }
            }

            clusters.push(Cluster::new(members));
        }

        clusters
    }

    /// Side-by-side placards: one cluster per column, read top to bottom
    pub fn by_columns<'a>(&self, blocks: &'a [TextBlock]) -> Vec<Cluster<'a>> {
        let mut sorted: Vec<&TextBlock> = blocks.iter().collect();
        sorted.sort_by_key(|b| b.bounds.left);

        let mut columns: Vec<Vec<&TextBlock>> = Vec::new();
        for block in sorted {
            let center_x = block.bounds.center_x();
            let column = columns.iter_mut().find(|column| {
                (column[0].bounds.center_x() - center_x).abs() < self.config.column_distance
            });
            match column {
                Some(column) => column.push(block),
                None => columns.push(vec![block]),
            }
        }

        columns
            .into_iter()
            .map(|mut column| {
                column.sort_by_key(|b| b.bounds.top);
                Cluster::new(column)
            })
            .collect()
    }
}
