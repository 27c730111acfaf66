//! Pattern tables for Spanish shelf labels
//!
//! Product names, weights and prices are recognized by ordered rule tables.
//! Within a table the first matching rule wins, so specific rules must come
//! before generic ones. Numeric rules run on [`normalize`]d text: lower case
//! with the decimal comma replaced by a dot.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Name used when no product rule matches
pub const GENERIC_PRODUCT_NAME: &str = "Producto";

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid label pattern {pattern:?}: {e}"))
}

/// Lower-case a line and turn decimal commas into dots
pub fn normalize(line: &str) -> String {
    line.to_lowercase().replace(',', ".")
}

fn parse_number(text: &str) -> Option<f64> {
    text.replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Product names
// ---------------------------------------------------------------------------

/// Maps a pattern on the lower-cased line to a canonical product name
pub struct NameRule {
    pub pattern: Regex,
    pub label: &'static str,
}

/// A line holding every term resolves to `label`, whichever rule matched it
pub struct NameOverride {
    pub terms: &'static [&'static str],
    pub label: &'static str,
}

const NAME_TABLE: &[(&str, &str)] = &[
    (r"tomate\s+(pera|cherry|rama|natural)", "Tomate"),
    (r"\bpera\s+(fruta|conferencia|limonera|ercolina)\b", "Pera"),
    (r"\bpera\b", "Tomate Pera"),
    (r"\brama\b", "Tomate Rama"),
    (r"\bcherry\b", "Tomate Cherry"),
    (r"\btomates?\b", "Tomate"),
    (r"patata\s+(blanca|roja|nueva)", "Patata"),
    (r"\bpatatas?\b", "Patata"),
    (r"\bcebollas?\b", "Cebolla"),
    (r"\blechugas?\b", "Lechuga"),
    (r"\bzanahorias?\b", "Zanahoria"),
    (r"\bpimientos?\b", "Pimiento"),
    (r"\bcalabac[íi]n", "Calabacín"),
    (r"\bberenjenas?\b", "Berenjena"),
    (r"\bpepinos?\b", "Pepino"),
    (r"\bapio\b", "Apio"),
    (r"\bbr[óo]coli\b", "Brócoli"),
    (r"\bcoliflor", "Coliflor"),
    (r"\bespinacas?\b", "Espinaca"),
    (r"\br[úu]cula\b", "Rúcula"),
    (r"\bacelgas?\b", "Acelga"),
    (r"\bnabos?\b", "Nabo"),
    (r"\br[áa]banos?\b", "Rábano"),
    (r"\bpuerros?\b", "Puerro"),
    (r"\bajos?\b", "Ajo"),
    (r"\bjengibre\b", "Jengibre"),
    (r"\blim[óo]n", "Limón"),
    (r"\bnaranjas?\b", "Naranja"),
    (r"\bmanzanas?\b", "Manzana"),
    (r"\bpl[áa]tanos?\b", "Plátano"),
    (r"\bmelocot[óo]n", "Melocotón"),
    (r"\balbaricoques?\b", "Albaricoque"),
    (r"\bciruelas?\b", "Ciruela"),
    (r"\buvas?\b", "Uva"),
    (r"\bfresas?\b", "Fresa"),
    (r"\bsand[íi]as?\b", "Sandía"),
    (r"\bmel[óo]n", "Melón"),
    (r"\bpi[ñn]as?\b", "Piña"),
    (r"\bkiwis?\b", "Kiwi"),
    (r"\baguacates?\b", "Aguacate"),
    (r"\bmangos?\b", "Mango"),
    (r"\bpapayas?\b", "Papaya"),
];

/// Product rules in priority order
pub static NAME_RULES: Lazy<Vec<NameRule>> = Lazy::new(|| {
    NAME_TABLE
        .iter()
        .map(|&(pattern, label)| NameRule {
            pattern: compile(pattern),
            label,
        })
        .collect()
});

/// Compound names that beat the table default for the line they appear on
pub const NAME_OVERRIDES: &[NameOverride] = &[
    NameOverride {
        terms: &["tomate", "pera"],
        label: "Tomate Pera",
    },
    NameOverride {
        terms: &["tomate", "rama"],
        label: "Tomate Rama",
    },
    NameOverride {
        terms: &["tomate", "cherry"],
        label: "Tomate Cherry",
    },
];

/// Product name for a single lower-cased line, if any rule matches it
pub fn match_name(line: &str) -> Option<&'static str> {
    let rule = NAME_RULES.iter().find(|rule| rule.pattern.is_match(line))?;
    let label = NAME_OVERRIDES
        .iter()
        .find(|o| o.terms.iter().all(|term| line.contains(term)))
        .map_or(rule.label, |o| o.label);
    Some(label)
}

// ---------------------------------------------------------------------------
// Weights
// ---------------------------------------------------------------------------

/// A package weight read from a label
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightReading {
    pub kg: f64,
    pub unit: &'static str,
}

/// Ordered weight rule: a pattern plus how to read its captures
pub struct WeightRule {
    pub name: &'static str,
    pub pattern: Regex,
    read: fn(&Captures) -> Option<WeightReading>,
}

impl WeightRule {
    /// Apply the rule to a normalized line
    pub fn apply(&self, line: &str) -> Option<WeightReading> {
        let caps = self.pattern.captures(line)?;
        (self.read)(&caps).filter(|w| w.kg > 0.0)
    }
}

const KG_UNIT: &str = r"(?:kilogramos?|kilos?|kgs?)\b";

fn kilograms(kg: f64) -> WeightReading {
    WeightReading { kg, unit: "kg" }
}

/// Weight rules in priority order
pub static WEIGHT_RULES: Lazy<Vec<WeightRule>> = Lazy::new(|| {
    vec![
        WeightRule {
            name: "fraction",
            pattern: compile(&format!(r"(medio|media|1/2|½)\s*{KG_UNIT}")),
            read: |_| Some(kilograms(0.5)),
        },
        WeightRule {
            name: "whole",
            pattern: compile(&format!(r"(?:^|[^\w.])(un|1|dos|2|tres|3)\s*{KG_UNIT}")),
            read: |caps| match &caps[1] {
                "un" | "1" => Some(kilograms(1.0)),
                "dos" | "2" => Some(kilograms(2.0)),
                "tres" | "3" => Some(kilograms(3.0)),
                _ => None,
            },
        },
        WeightRule {
            name: "decimal_kg",
            pattern: compile(&format!(
                r"(?:^|[^\w.])(0\.5|0\.25|0\.75|1\.5|2\.5)\s*{KG_UNIT}"
            )),
            read: |caps| parse_number(&caps[1]).map(kilograms),
        },
        WeightRule {
            name: "general",
            pattern: compile(
                r"(?:^|[^\w.])(\d+(?:\.\d+)?)\s*(kilogramos?|kilos?|kgs?|gramos?|grs?|g)\b",
            ),
            read: |caps| {
                let value = parse_number(&caps[1])?;
                if caps[2].starts_with('k') {
                    Some(kilograms(value))
                } else {
                    Some(WeightReading {
                        kg: value / 1000.0,
                        unit: "g",
                    })
                }
            },
        },
    ]
});

/// First weight any rule reads from a normalized line
pub fn match_weight(line: &str) -> Option<(&'static str, WeightReading)> {
    WEIGHT_RULES
        .iter()
        .find_map(|rule| rule.apply(line).map(|w| (rule.name, w)))
}

/// Weight rule with the given name
pub fn weight_rule(name: &str) -> Option<&'static WeightRule> {
    WEIGHT_RULES.iter().find(|rule| rule.name == name)
}

// ---------------------------------------------------------------------------
// Prices
// ---------------------------------------------------------------------------

/// What a price rule reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceKind {
    /// Unit price per kilogram
    PerKg,
    /// Shelf price carrying a currency sign or spelled currency words
    Tagged,
    /// Bare number shaped like a price
    Untagged,
}

/// Ordered price rule: a pattern plus how to read its captures
pub struct PriceRule {
    pub name: &'static str,
    pub kind: PriceKind,
    pub pattern: Regex,
    read: fn(&Captures) -> Option<f64>,
}

impl PriceRule {
    /// Apply the rule to a normalized line; only strictly positive prices count
    pub fn apply(&self, line: &str) -> Option<f64> {
        let caps = self.pattern.captures(line)?;
        (self.read)(&caps).filter(|p| *p > 0.0)
    }
}

fn first_group(caps: &Captures) -> Option<f64> {
    parse_number(&caps[1])
}

/// Whole cents are divided once so 1 + 39/100 lands on the nearest f64 to 1.39
fn euros_and_cents(caps: &Captures) -> Option<f64> {
    let euros = parse_number(&caps[1])?;
    let cents = parse_number(&caps[2])?;
    Some((euros * 100.0 + cents) / 100.0)
}

fn truncated_cents(caps: &Captures) -> Option<f64> {
    let digits: u32 = caps[1].parse().ok()?;
    (100..1000).contains(&digits).then(|| digits as f64 / 100.0)
}

/// Any per-kilogram price, used to mask unit prices out of a line
static PER_KG_ANY: Lazy<Regex> =
    Lazy::new(|| compile(r"\d+\.\d{1,2}\s*€?\s*/\s*(?:kg|kilo)s?"));

/// Unit price rules, tried before any plain price
pub static PER_KG_RULES: Lazy<Vec<PriceRule>> = Lazy::new(|| {
    vec![
        PriceRule {
            name: "per_kg_trailing",
            kind: PriceKind::PerKg,
            pattern: compile(r"(\d+\.\d{1,2})\s*€?\s*/\s*(?:kg|kilo)"),
            read: first_group,
        },
        PriceRule {
            name: "per_kg_prefixed",
            kind: PriceKind::PerKg,
            pattern: compile(r"€\s*(\d+\.\d{1,2})\s*/\s*(?:kg|kilo)"),
            read: first_group,
        },
    ]
});

/// Plain price rules in priority order
pub static PLAIN_PRICE_RULES: Lazy<Vec<PriceRule>> = Lazy::new(|| {
    vec![
        PriceRule {
            name: "currency_prefix",
            kind: PriceKind::Tagged,
            pattern: compile(r"€\s*(\d+\.\d{1,2})"),
            read: first_group,
        },
        PriceRule {
            name: "currency_suffix",
            kind: PriceKind::Tagged,
            pattern: compile(r"(\d+\.\d{1,2})\s*€"),
            read: first_group,
        },
        PriceRule {
            name: "spelled_euros_cents",
            kind: PriceKind::Tagged,
            pattern: compile(r"(\d+)\s*euros?\s*(?:y\s*)?(\d{1,2})\s*c[eé]ntimos?"),
            read: euros_and_cents,
        },
        PriceRule {
            name: "spelled_euros",
            kind: PriceKind::Tagged,
            pattern: compile(r"(\d+)\.(\d{2})\s*euros?"),
            read: euros_and_cents,
        },
        PriceRule {
            name: "cents_only",
            kind: PriceKind::Tagged,
            pattern: compile(r"(\d+)\s*c[eé]ntimos?"),
            read: |caps| parse_number(&caps[1]).map(|c| c / 100.0),
        },
        PriceRule {
            name: "trailing_decimal",
            kind: PriceKind::Untagged,
            pattern: compile(r"(\d{1,2})\.(\d{2})[.:]?\s*$"),
            read: euros_and_cents,
        },
        truncated_price_rule(),
        PriceRule {
            name: "bare_decimal",
            kind: PriceKind::Untagged,
            pattern: compile(r"^(\d{1,2}\.\d{2})[.:]?$"),
            read: first_group,
        },
    ]
});

/// "159." read as 1.59: exactly three digits closed by a period or colon
fn truncated_price_rule() -> PriceRule {
    PriceRule {
        name: "truncated_three_digit",
        kind: PriceKind::Untagged,
        pattern: compile(r"^(\d{3})[.:]\s*$"),
        read: truncated_cents,
    }
}

/// Standalone copy of the truncated-price rule for multi-line fragments
pub static TRUNCATED_PRICE_RULE: Lazy<PriceRule> = Lazy::new(truncated_price_rule);

/// First unit price any per-kg rule reads from a normalized line
pub fn match_per_kg(line: &str) -> Option<(&'static str, f64)> {
    PER_KG_RULES
        .iter()
        .find_map(|rule| rule.apply(line).map(|p| (rule.name, p)))
}

/// Replace every per-kilogram price in a normalized line with a space
pub fn mask_per_kg(line: &str) -> String {
    PER_KG_ANY.replace_all(line, " ").into_owned()
}

/// First plain price any rule reads from a normalized, masked line
///
/// A line spanning several OCR lines also has each of its fragments checked
/// for a truncated price before the bare-decimal fallback.
pub fn match_plain_price(line: &str) -> Option<(&'static str, f64)> {
    match_price_rules(line, false)
}

/// First plain price a currency-tagged rule reads from a normalized, masked line
pub fn match_tagged_price(line: &str) -> Option<(&'static str, f64)> {
    match_price_rules(line, true)
}

fn match_price_rules(line: &str, tagged_only: bool) -> Option<(&'static str, f64)> {
    let flat = line.replace('\n', " ");
    let flat = flat.trim();

    let rules = PLAIN_PRICE_RULES
        .iter()
        .filter(|rule| !tagged_only || rule.kind == PriceKind::Tagged);
    for rule in rules {
        if let Some(price) = rule.apply(flat) {
            return Some((rule.name, price));
        }
        if rule.name == TRUNCATED_PRICE_RULE.name && line.contains('\n') {
            let fragment = line
                .split('\n')
                .find_map(|part| TRUNCATED_PRICE_RULE.apply(part.trim()));
            if let Some(price) = fragment {
                return Some((rule.name, price));
            }
        }
    }
    None
}

/// Every decimal amount on a normalized line
pub fn all_decimal_amounts(line: &str) -> impl Iterator<Item = f64> + '_ {
    static DECIMAL: Lazy<Regex> = Lazy::new(|| compile(r"\d+\.\d{1,2}"));
    DECIMAL
        .find_iter(line)
        .filter_map(|m| parse_number(m.as_str()))
}
