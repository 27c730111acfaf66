//! Product extraction from one cluster of label text
//!
//! Name, weight and price are each resolved by scanning the cluster's lines
//! top to bottom against the rule tables in [`patterns`](super::patterns).
//! Extraction is a pure function of the cluster text and box.

use tracing::debug;

use super::heuristics::{self, ExtractionSignals, PricingSignals};
use super::patterns::{self, WeightReading, GENERIC_PRODUCT_NAME};
use super::ProductRecord;
use crate::overlay::AnchorConfig;
use crate::vision::Rect;

/// Confidence of a record with a name but no price
const NAME_ONLY_CONFIDENCE: f32 = 0.3;

/// Weight assumed when the label prints none
const DEFAULT_WEIGHT: WeightReading = WeightReading { kg: 1.0, unit: "kg" };

/// Prices read from one cluster
#[derive(Debug, Clone, Copy, PartialEq)]
struct PriceReading {
    displayed: f64,
    /// Per-kilogram figure printed on the label
    declared_per_kg: Option<f64>,
    /// The per-kilogram figure is the only price on the label
    is_per_kg: bool,
}

/// Extracts product records from cluster text
#[derive(Debug, Clone, Default)]
pub struct ProductExtractor {
    anchor: AnchorConfig,
}

impl ProductExtractor {
    pub fn new() -> Self {
        Self::with_anchor(AnchorConfig::default())
    }

    pub fn with_anchor(anchor: AnchorConfig) -> Self {
        Self { anchor }
    }

    /// Extract one product record from a cluster
    ///
    /// Returns a full record when a price is found, a name-only record when
    /// just the product name resolves, and `None` otherwise.
    pub fn extract(&self, text: &str, bounds: Option<Rect>) -> Option<ProductRecord> {
        let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        let anchor = self.anchor.anchor_or_default(bounds.as_ref());

        let name = resolve_name(&lines);
        let Some(price) = resolve_price(&lines) else {
            return name.map(|name| {
                debug!("Name-only record: {}", name);
                ProductRecord {
                    name: name.to_string(),
                    displayed_price: 0.0,
                    weight_kg: DEFAULT_WEIGHT.kg,
                    weight_unit: DEFAULT_WEIGHT.unit.to_string(),
                    price_per_kg: 0.0,
                    is_price_per_kg: false,
                    is_deceptive: false,
                    confidence: NAME_ONLY_CONFIDENCE,
                    anchor,
                }
            });
        };
        let weight = resolve_weight(&lines).unwrap_or(DEFAULT_WEIGHT);

        let displayed_price = heuristics::round2(price.displayed);
        let price_per_kg = if price.is_per_kg {
            displayed_price
        } else {
            heuristics::round2(displayed_price / weight.kg)
        };

        let is_deceptive = heuristics::is_deceptive(&PricingSignals {
            price: displayed_price,
            candidate_prices: &[displayed_price],
            weight_kg: weight.kg,
            declared_unit_price: price.declared_per_kg.map(heuristics::round2),
            raw_text: text,
        });

        let confidence = heuristics::confidence(&ExtractionSignals {
            price_found: true,
            weight_kg: weight.kg,
            has_declared_unit_price: price.declared_per_kg.is_some(),
            has_product_name: name.is_some(),
        });

        let record = ProductRecord {
            name: name.unwrap_or(GENERIC_PRODUCT_NAME).to_string(),
            displayed_price,
            weight_kg: weight.kg,
            weight_unit: weight.unit.to_string(),
            price_per_kg,
            is_price_per_kg: price.is_per_kg,
            is_deceptive,
            confidence,
            anchor,
        };
        debug!(
            "Extracted {} at {:.2} ({} {}), {:.2}/kg, deceptive: {}",
            record.name,
            record.displayed_price,
            record.weight_kg,
            record.weight_unit,
            record.price_per_kg,
            record.is_deceptive
        );
        Some(record)
    }
}

/// First product rule matching any line, scanning top to bottom
fn resolve_name(lines: &[&str]) -> Option<&'static str> {
    lines.iter().find_map(|line| {
        let name = patterns::match_name(&line.to_lowercase())?;
        debug!("Product name {:?} from line {:?}", name, line);
        Some(name)
    })
}

fn resolve_weight(lines: &[&str]) -> Option<WeightReading> {
    lines.iter().find_map(|line| {
        let (rule, weight) = patterns::match_weight(&patterns::normalize(line))?;
        debug!("Weight {} {} from {} rule on {:?}", weight.kg, weight.unit, rule, line);
        Some(weight)
    })
}

/// Per-kg forms first, then plain prices with per-kg forms masked out
///
/// Once a per-kg price is read only a currency-tagged price may replace it as
/// the displayed price. The whole cluster text is tried after the individual
/// lines so prices split across OCR lines are still found.
fn resolve_price(lines: &[&str]) -> Option<PriceReading> {
    let joined = lines.join("\n");
    let candidates: Vec<String> = lines
        .iter()
        .copied()
        .chain(std::iter::once(joined.as_str()))
        .map(patterns::normalize)
        .collect();

    let per_kg = candidates.iter().find_map(|line| patterns::match_per_kg(line));
    let plain_rules: fn(&str) -> Option<(&'static str, f64)> = match per_kg {
        Some(_) => patterns::match_tagged_price,
        None => patterns::match_plain_price,
    };
    let plain = candidates
        .iter()
        .find_map(|line| plain_rules(&patterns::mask_per_kg(line)));

    match (plain, per_kg) {
        (Some((rule, displayed)), declared) => {
            debug!("Plain price {} from {} rule", displayed, rule);
            Some(PriceReading {
                displayed,
                declared_per_kg: declared.map(|(_, p)| p),
                is_per_kg: false,
            })
        }
        (None, Some((rule, per_kg))) => {
            debug!("Price per kg {} from {} rule", per_kg, rule);
            Some(PriceReading {
                displayed: per_kg,
                declared_per_kg: Some(per_kg),
                is_per_kg: true,
            })
        }
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> Option<ProductRecord> {
        ProductExtractor::new().extract(text, Some(Rect::new(100, 200, 300, 260)))
    }

    #[test]
    fn test_pack_price_with_unit_price() {
        let record = extract("Tomate Pera\n500G\n1,39€\n2,78€/KG").unwrap();

        assert_eq!(record.name, "Tomate Pera");
        assert_eq!(record.weight_kg, 0.5);
        assert_eq!(record.weight_unit, "g");
        assert_eq!(record.displayed_price, 1.39);
        assert_eq!(record.price_per_kg, 2.78);
        assert!(!record.is_price_per_kg);
        assert!(record.is_deceptive);
        assert!((record.confidence - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_unit_price_only_label() {
        let record = extract("Tomate pera\n2,19€/Kg").unwrap();

        assert_eq!(record.name, "Tomate Pera");
        assert_eq!(record.displayed_price, 2.19);
        assert_eq!(record.price_per_kg, 2.19);
        assert_eq!(record.weight_kg, 1.0);
        assert!(record.is_price_per_kg);
        assert!(!record.is_deceptive);
    }

    #[test]
    fn test_tomate_rama_unit_price() {
        let record = extract("Tomate rama\n2,29€/Kg").unwrap();

        assert_eq!(record.name, "Tomate Rama");
        assert_eq!(record.displayed_price, 2.29);
        assert!(record.is_price_per_kg);
    }

    #[test]
    fn test_unit_price_with_stray_number() {
        // Packing date and caliber printed next to the unit price
        let record = extract("Tomate pera\n2,19€/Kg\n12.05").unwrap();
        assert_eq!(record.displayed_price, 2.19);
        assert_eq!(record.price_per_kg, 2.19);
        assert!(record.is_price_per_kg);
        assert!(!record.is_deceptive);

        let record = extract("Tomate rama\n2,29€/Kg\nCalibre 57.67").unwrap();
        assert_eq!(record.name, "Tomate Rama");
        assert_eq!(record.displayed_price, 2.29);
        assert!(record.is_price_per_kg);
        assert!(!record.is_deceptive);
    }

    #[test]
    fn test_unit_price_with_truncated_number() {
        let record = extract("Tomate rama\n159.\n2,29€/Kg").unwrap();
        assert_eq!(record.displayed_price, 2.29);
        assert!(record.is_price_per_kg);
    }

    #[test]
    fn test_spelled_price_overrides_unit_price() {
        let record = extract("Naranja\n2 kg\n1 euro 40 céntimos\n0,70€/kg").unwrap();
        assert_eq!(record.displayed_price, 1.4);
        assert!(!record.is_price_per_kg);
        assert_eq!(record.price_per_kg, 0.7);
    }

    #[test]
    fn test_name_only_record() {
        let record = extract("Patata nueva\norigen España").unwrap();

        assert_eq!(record.name, "Patata");
        assert_eq!(record.displayed_price, 0.0);
        assert_eq!(record.price_per_kg, 0.0);
        assert_eq!(record.weight_kg, 1.0);
        assert!(!record.is_deceptive);
        assert!(!record.has_price());
        assert!((record.confidence - 0.3).abs() < 1e-6);
        assert_eq!(record.anchor, Rect::new(175, 135, 225, 185));
    }

    #[test]
    fn test_nothing_found() {
        assert!(extract("oferta\nsemana").is_none());
        assert!(extract("").is_none());
    }

    #[test]
    fn test_price_without_name() {
        let record = extract("1,20€").unwrap();
        assert_eq!(record.name, GENERIC_PRODUCT_NAME);
        assert_eq!(record.displayed_price, 1.2);
        assert!((record.confidence - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_weight_divides_price() {
        let record = extract("Cebolla\nmedio kilo\n0,85€").unwrap();
        assert_eq!(record.weight_kg, 0.5);
        assert_eq!(record.weight_unit, "kg");
        assert_eq!(record.price_per_kg, 1.7);
        assert!(record.is_deceptive);
    }

    #[test]
    fn test_truncated_price_line() {
        let record = extract("Tomate rama\n229.").unwrap();
        assert_eq!(record.displayed_price, 2.29);
        assert!(!record.is_price_per_kg);
    }

    #[test]
    fn test_spelled_price() {
        let record = extract("Naranja\n1 euro y 39 céntimos").unwrap();
        assert_eq!(record.name, "Naranja");
        assert_eq!(record.displayed_price, 1.39);
    }

    #[test]
    fn test_missing_box_uses_default_anchor() {
        let record = ProductExtractor::new().extract("Tomate pera\n2,19€/Kg", None).unwrap();
        assert_eq!(record.anchor, Rect::new(25, -65, 75, -15));
    }

    #[test]
    fn test_extraction_is_pure() {
        let extractor = ProductExtractor::new();
        let text = "Tomate Pera\n500G\n1,39€\n2,78€/KG";
        let bounds = Some(Rect::new(0, 0, 120, 80));
        assert_eq!(extractor.extract(text, bounds), extractor.extract(text, bounds));
    }

    #[test]
    fn test_record_invariants() {
        let samples = [
            "Tomate Pera\n500G\n1,39€\n2,78€/KG",
            "Tomate pera\n2,19€/Kg",
            "Cebolla\nmedio kilo\n0,85€",
            "Pimiento\n750 g\n€2.10",
            "Kiwi\n3 kg\n5,99 euros",
            "Patata nueva",
            "139 céntimos",
        ];

        for text in samples {
            let record = extract(text).unwrap();
            assert!((0.0..=1.0).contains(&record.confidence), "{text:?}");
            assert!(record.weight_kg > 0.0, "{text:?}");
            if !record.has_price() {
                continue;
            }
            if record.is_price_per_kg {
                assert_eq!(record.price_per_kg, record.displayed_price, "{text:?}");
            } else {
                assert_eq!(
                    record.price_per_kg,
                    heuristics::round2(record.displayed_price / record.weight_kg),
                    "{text:?}"
                );
            }
        }
    }
}
