//! Whole-text fallback parse
//!
//! Reads everything the recognizer returned as a single unnamed label: the
//! largest amount mentioned is taken as the displayed price.

use tracing::debug;

use super::heuristics::{self, ExtractionSignals, PricingSignals};
use super::patterns::{self, WeightReading, GENERIC_PRODUCT_NAME};
use super::ProductRecord;
use crate::overlay::AnchorConfig;

/// Amounts at or above this are not prices
const MAX_PLAUSIBLE_PRICE: f64 = 1000.0;

/// Parse all recognized text as one product, `None` when it holds no amount
pub fn parse_whole_text(text: &str, anchor: &AnchorConfig) -> Option<ProductRecord> {
    let mut prices: Vec<f64> = Vec::new();
    let mut weight: Option<WeightReading> = None;
    let mut unit_price: Option<f64> = None;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let clean = patterns::normalize(line);

        prices.extend(
            patterns::all_decimal_amounts(&clean).filter(|p| *p > 0.0 && *p < MAX_PLAUSIBLE_PRICE),
        );

        // Later lines override earlier ones
        let general = patterns::weight_rule("general");
        if let Some(reading) = general.and_then(|rule| rule.apply(&clean)) {
            weight = Some(reading);
        }

        if let Some((_, per_kg)) = patterns::match_per_kg(&clean) {
            unit_price = Some(per_kg);
        }
    }

    if prices.is_empty() {
        debug!("No prices found in text");
        return None;
    }
    let displayed_price = heuristics::round2(prices.iter().copied().fold(f64::MIN, f64::max));

    let effective = weight.unwrap_or(WeightReading { kg: 1.0, unit: "kg" });
    let flagged = heuristics::is_deceptive(&PricingSignals {
        price: displayed_price,
        candidate_prices: &prices,
        weight_kg: effective.kg,
        declared_unit_price: unit_price,
        raw_text: text,
    });

    debug!(
        "Whole-text prices {:?}, weight {:?}, unit price {:?}",
        prices, weight, unit_price
    );

    Some(ProductRecord {
        name: GENERIC_PRODUCT_NAME.to_string(),
        displayed_price,
        weight_kg: effective.kg,
        weight_unit: effective.unit.to_string(),
        price_per_kg: heuristics::round2(displayed_price / effective.kg),
        is_price_per_kg: false,
        // Only a printed weight can make a single-label reading deceptive
        is_deceptive: flagged && weight.is_some(),
        confidence: heuristics::confidence(&ExtractionSignals {
            price_found: true,
            weight_kg: effective.kg,
            has_declared_unit_price: unit_price.is_some(),
            has_product_name: false,
        }),
        anchor: anchor.anchor_or_default(None),
    })
}
