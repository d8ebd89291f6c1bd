//! Billing period (competência) extraction.

use chrono::NaiveDate;

use super::patterns::{MONTH_YEAR, REFERENCE_MONTH};
use super::{BillingPeriod, DescriptionRule, EnrichedField, Enrichment, ExtractionMatch};

/// Month number for a Portuguese month name, accent and case insensitive.
pub fn month_from_name(name: &str) -> Option<u32> {
    let month = match name.trim().to_uppercase().as_str() {
        "JANEIRO" => 1,
        "FEVEREIRO" => 2,
        "MARÇO" | "MARCO" => 3,
        "ABRIL" => 4,
        "MAIO" => 5,
        "JUNHO" => 6,
        "JULHO" => 7,
        "AGOSTO" => 8,
        "SETEMBRO" => 9,
        "OUTUBRO" => 10,
        "NOVEMBRO" => 11,
        "DEZEMBRO" => 12,
        _ => return None,
    };
    Some(month)
}

/// First and last calendar day of a month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((start, next_month.pred_opt()?))
}

fn period_match(
    label: &str,
    year: i32,
    month: u32,
    start: usize,
    end: usize,
) -> Option<ExtractionMatch<Enrichment>> {
    let (first, last) = month_bounds(year, month)?;
    let period = BillingPeriod {
        label: label.trim().to_uppercase(),
        start: first,
        end: last,
    };
    Some(ExtractionMatch::new(Enrichment::BillingPeriod(period), label).with_position(start, end))
}

/// Portuguese month name, an optional "DE", and a four-digit year.
pub struct MonthYearPeriodRule;

impl DescriptionRule for MonthYearPeriodRule {
    fn name(&self) -> &'static str {
        "month_year_period"
    }

    fn field(&self) -> EnrichedField {
        EnrichedField::BillingPeriod
    }

    fn extract(&self, description: &str) -> Option<ExtractionMatch<Enrichment>> {
        let caps = MONTH_YEAR.captures(description)?;
        let month = month_from_name(&caps[1])?;
        let year: i32 = caps[2].parse().ok()?;

        let full_match = caps.get(0)?;
        period_match(full_match.as_str(), year, month, full_match.start(), full_match.end())
    }
}

/// "REF: MM/YYYY" reference month.
pub struct ReferencePeriodRule;

impl DescriptionRule for ReferencePeriodRule {
    fn name(&self) -> &'static str {
        "reference_period"
    }

    fn field(&self) -> EnrichedField {
        EnrichedField::BillingPeriod
    }

    fn extract(&self, description: &str) -> Option<ExtractionMatch<Enrichment>> {
        let caps = REFERENCE_MONTH.captures(description)?;
        let month: u32 = caps[1].parse().ok()?;
        let year: i32 = caps[2].parse().ok()?;

        let full_match = caps.get(0)?;
        period_match(full_match.as_str(), year, month, full_match.start(), full_match.end())
    }
}
