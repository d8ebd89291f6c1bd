//! Brazilian amount parsing and the description total fallback.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::DESCRIPTION_TOTAL;
use super::{DescriptionRule, EnrichedField, Enrichment, ExtractionMatch};

/// Parse an amount in Brazilian notation ("1.234,56").
///
/// Dots are thousands separators and the comma is the decimal separator.
/// The scale written in the text is preserved.
pub fn parse_brazilian_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    let normalized = cleaned.replace('.', "").replace(',', ".");
    if normalized.is_empty() {
        return None;
    }

    Decimal::from_str(&normalized).ok()
}

/// "VALOR TOTAL" written in the description.
///
/// Only runs when the document's values block yielded nothing.
pub struct DescriptionTotalRule;

impl DescriptionRule for DescriptionTotalRule {
    fn name(&self) -> &'static str {
        "description_total"
    }

    fn field(&self) -> EnrichedField {
        EnrichedField::TotalValue
    }

    fn extract(&self, description: &str) -> Option<ExtractionMatch<Enrichment>> {
        let caps = DESCRIPTION_TOTAL.captures(description)?;
        let value = parse_brazilian_amount(&caps[1])?;

        let full_match = caps.get(0)?;
        Some(
            ExtractionMatch::new(Enrichment::TotalValue(value), full_match.as_str())
                .with_position(full_match.start(), full_match.end()),
        )
    }
}
