//! Label Analysis Layer
//!
//! Turns clusters of recognized label text into product-price records.

pub mod extractor;
pub mod grouping;
pub mod heuristics;
pub mod legacy;
pub mod patterns;

pub use extractor::ProductExtractor;
pub use grouping::{Cluster, GroupingConfig, TextBlockGrouper};
pub use heuristics::{confidence, is_deceptive, round2};
pub use patterns::GENERIC_PRODUCT_NAME;

use serde::{Deserialize, Serialize};

use crate::vision::Rect;

/// One product listing read from a shelf label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Canonical product name, or the generic placeholder
    pub name: String,
    /// Price shown on the label, 0 for a name-only record
    pub displayed_price: f64,
    pub weight_kg: f64,
    /// Unit the weight was printed in ("kg" or "g")
    pub weight_unit: String,
    pub price_per_kg: f64,
    /// The displayed price is itself a per-kilogram price
    pub is_price_per_kg: bool,
    pub is_deceptive: bool,
    /// Extraction confidence (0.0 - 1.0)
    pub confidence: f32,
    /// Suggested marker placement above the label, in image pixels
    pub anchor: Rect,
}

impl ProductRecord {
    /// Whether a price was read, as opposed to a name-only record
    pub fn has_price(&self) -> bool {
        self.displayed_price > 0.0
    }
}

/// Grouping stage that produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStage {
    /// Blocks inside detected white label regions
    Regions,
    /// Proximity clusters over every block
    Proximity,
    /// Side-by-side placards grouped by column
    Columns,
    /// Whole-text parse of everything recognized
    Legacy,
}

/// Products found in one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub products: Vec<ProductRecord>,
    pub count: usize,
    pub stage: AnalysisStage,
}

impl AnalysisResult {
    /// Wrap a non-empty record list; `None` when nothing was extracted
    pub fn from_products(products: Vec<ProductRecord>, stage: AnalysisStage) -> Option<Self> {
        if products.is_empty() {
            return None;
        }
        Some(Self {
            count: products.len(),
            products,
            stage,
        })
    }

    pub fn deceptive(&self) -> impl Iterator<Item = &ProductRecord> {
        self.products.iter().filter(|p| p.is_deceptive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, price: f64, deceptive: bool) -> ProductRecord {
        ProductRecord {
            name: name.to_string(),
            displayed_price: price,
            weight_kg: 1.0,
            weight_unit: "kg".to_string(),
            price_per_kg: price,
            is_price_per_kg: true,
            is_deceptive: deceptive,
            confidence: 0.8,
            anchor: Rect::new(0, -65, 50, -15),
        }
    }

    #[test]
    fn test_empty_result_is_none() {
        assert!(AnalysisResult::from_products(vec![], AnalysisStage::Regions).is_none());
    }

    #[test]
    fn test_result_counts_products() {
        let result = AnalysisResult::from_products(
            vec![record("Tomate Pera", 2.19, false), record("Patata", 1.2, true)],
            AnalysisStage::Proximity,
        )
        .unwrap();

        assert_eq!(result.count, 2);
        assert_eq!(result.deceptive().count(), 1);
    }

    #[test]
    fn test_record_serializes_to_json() {
        let json = serde_json::to_value(record("Tomate Rama", 2.29, false)).unwrap();
        assert_eq!(json["name"], "Tomate Rama");
        assert_eq!(json["anchor"]["top"], -65);

        let result =
            AnalysisResult::from_products(vec![record("x", 1.0, false)], AnalysisStage::Legacy)
                .unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["stage"], "legacy");
        assert_eq!(json["count"], 1);
    }

    #[test]
    fn test_name_only_record_has_no_price() {
        assert!(!record("Patata", 0.0, false).has_price());
        assert!(record("Patata", 0.5, false).has_price());
    }
}
