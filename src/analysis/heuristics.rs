//! Deceptive pricing heuristic and confidence scoring

/// Weights treated as suspicious fractions of a kilogram
pub const SUSPICIOUS_WEIGHTS: [f64; 5] = [0.5, 0.75, 0.25, 0.33, 0.66];

const SUSPICIOUS_WEIGHT_TOLERANCE: f64 = 0.05;
const MAX_PRICE_SPREAD: f64 = 0.5;
const MAX_UNIT_PRICE_DRIFT: f64 = 0.1;

/// Round a currency amount to cents, halves away from zero
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Everything the deception rules look at for one label
#[derive(Debug, Clone, Copy)]
pub struct PricingSignals<'a> {
    /// Price shown on the label
    pub price: f64,
    /// Every price candidate seen on the label
    pub candidate_prices: &'a [f64],
    pub weight_kg: f64,
    /// Unit price printed on the label, if any
    pub declared_unit_price: Option<f64>,
    pub raw_text: &'a str,
}

/// Which rule flagged a label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeceptionReason {
    NonDefaultWeight,
    PriceSpread,
    UnitPriceMismatch,
    SubKiloSmallPrint,
    SuspiciousFraction,
}

/// First deception rule the label trips, in rule order
///
/// Any weight other than exactly 1 kg trips the first rule, so the later
/// weight-based rules only matter when that rule is relaxed.
pub fn deception_reason(signals: &PricingSignals<'_>) -> Option<DeceptionReason> {
    let weight = signals.weight_kg;

    if weight != 1.0 {
        return Some(DeceptionReason::NonDefaultWeight);
    }

    if signals.candidate_prices.len() > 1 {
        let max = signals
            .candidate_prices
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let min = signals
            .candidate_prices
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min);
        if max - min > MAX_PRICE_SPREAD {
            return Some(DeceptionReason::PriceSpread);
        }
    }

    if let Some(declared) = signals.declared_unit_price.filter(|p| *p > 0.0) {
        if (signals.price / weight - declared).abs() > MAX_UNIT_PRICE_DRIFT {
            return Some(DeceptionReason::UnitPriceMismatch);
        }
    }

    let text = signals.raw_text.to_lowercase();
    let mentions_kilo = text.contains("kilo") || text.contains("kg");
    if mentions_kilo && weight < 1.0 {
        return Some(DeceptionReason::SubKiloSmallPrint);
    }

    if SUSPICIOUS_WEIGHTS
        .iter()
        .any(|w| (weight - w).abs() < SUSPICIOUS_WEIGHT_TOLERANCE)
    {
        return Some(DeceptionReason::SuspiciousFraction);
    }

    None
}

/// Whether a label's pricing is plausibly misleading
pub fn is_deceptive(signals: &PricingSignals<'_>) -> bool {
    deception_reason(signals).is_some()
}

/// Which extraction signals succeeded for a record
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractionSignals {
    pub price_found: bool,
    pub weight_kg: f64,
    pub has_declared_unit_price: bool,
    pub has_product_name: bool,
}

/// Additive confidence score, clamped to [0, 1]
pub fn confidence(signals: &ExtractionSignals) -> f32 {
    let mut score = 0.3f32;

    if signals.price_found {
        score += 0.2;
    }
    if signals.weight_kg > 0.0 && signals.weight_kg != 1.0 {
        score += 0.2;
    }
    if signals.has_declared_unit_price {
        score += 0.1;
    }
    if signals.has_product_name {
        score += 0.2;
    }

    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals<'a>(
        price: f64,
        candidates: &'a [f64],
        weight: f64,
        text: &'a str,
    ) -> PricingSignals<'a> {
        PricingSignals {
            price,
            candidate_prices: candidates,
            weight_kg: weight,
            declared_unit_price: None,
            raw_text: text,
        }
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(2.785), 2.79);
        assert_eq!(round2(1.39 / 0.5), 2.78);
        assert_eq!(round2(0.1 + 0.2), 0.3);
        assert_eq!(round2(5.0), 5.0);
    }

    #[test]
    fn test_round2_idempotent() {
        for x in [0.0, 0.005, 1.234_567, 2.785, 10.0 / 3.0, 999.995, 123_456.789] {
            assert_eq!(round2(round2(x)), round2(x), "not idempotent for {x}");
        }
    }

    #[test]
    fn test_non_default_weight_is_deceptive() {
        let s = signals(1.39, &[1.39], 0.5, "Tomate Pera 500G");
        assert_eq!(deception_reason(&s), Some(DeceptionReason::NonDefaultWeight));

        let s = signals(4.0, &[4.0], 2.0, "2 kg");
        assert!(is_deceptive(&s));
    }

    #[test]
    fn test_price_spread() {
        let s = signals(2.0, &[2.0, 1.2], 1.0, "");
        assert_eq!(deception_reason(&s), Some(DeceptionReason::PriceSpread));

        let s = signals(2.0, &[2.0, 1.8], 1.0, "");
        assert!(!is_deceptive(&s));
    }

    #[test]
    fn test_unit_price_mismatch() {
        let mut s = signals(2.19, &[2.19], 1.0, "2,19€/Kg");
        s.declared_unit_price = Some(2.19);
        assert!(!is_deceptive(&s));

        s.declared_unit_price = Some(2.50);
        assert_eq!(deception_reason(&s), Some(DeceptionReason::UnitPriceMismatch));
    }

    #[test]
    fn test_plain_kilo_label_is_fair() {
        let s = signals(2.29, &[2.29], 1.0, "Tomate rama\n2,29€/Kg");
        assert!(!is_deceptive(&s));
    }

    #[test]
    fn test_confidence_bounds() {
        let none = ExtractionSignals::default();
        assert!((confidence(&none) - 0.3).abs() < 1e-6);

        let all = ExtractionSignals {
            price_found: true,
            weight_kg: 0.5,
            has_declared_unit_price: true,
            has_product_name: true,
        };
        assert_eq!(confidence(&all), 1.0);
    }

    #[test]
    fn test_confidence_ignores_default_weight() {
        let s = ExtractionSignals {
            price_found: true,
            weight_kg: 1.0,
            has_declared_unit_price: false,
            has_product_name: true,
        };
        assert!((confidence(&s) - 0.7).abs() < 1e-6);
    }
}
