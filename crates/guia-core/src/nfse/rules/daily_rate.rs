//! Daily-rate (diária) quantity and unit value extraction.

use super::amounts::parse_brazilian_amount;
use super::patterns::{DAILY_RATE_QUANTITY, DAILY_RATE_UNIT_VALUE};
use super::{DescriptionRule, EnrichedField, Enrichment, ExtractionMatch};

/// First integer written right before "DIÁRIAS"/"DIARIAS" that fits a `u32`.
pub struct DailyRateQuantityRule;

impl DescriptionRule for DailyRateQuantityRule {
    fn name(&self) -> &'static str {
        "daily_rate_quantity"
    }

    fn field(&self) -> EnrichedField {
        EnrichedField::DailyRateQuantity
    }

    fn extract(&self, description: &str) -> Option<ExtractionMatch<Enrichment>> {
        // A count too large for u32 is skipped in favour of later mentions.
        DAILY_RATE_QUANTITY.captures_iter(description).find_map(|caps| {
            let quantity: u32 = caps[1].parse().ok()?;
            let full_match = caps.get(0)?;
            Some(
                ExtractionMatch::new(Enrichment::DailyRateQuantity(quantity), full_match.as_str())
                    .with_position(full_match.start(), full_match.end()),
            )
        })
    }
}

/// Amount after "VALOR DA DIÁRIA ... R$".
pub struct DailyRateUnitValueRule;

impl DescriptionRule for DailyRateUnitValueRule {
    fn name(&self) -> &'static str {
        "daily_rate_unit_value"
    }

    fn field(&self) -> EnrichedField {
        EnrichedField::DailyRateUnitValue
    }

    fn extract(&self, description: &str) -> Option<ExtractionMatch<Enrichment>> {
        let caps = DAILY_RATE_UNIT_VALUE.captures(description)?;
        let value = parse_brazilian_amount(&caps[1])?;

        let full_match = caps.get(0)?;
        Some(
            ExtractionMatch::new(Enrichment::DailyRateUnitValue(value), full_match.as_str())
                .with_position(full_match.start(), full_match.end()),
        )
    }
}
