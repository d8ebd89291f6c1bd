//! Rule-based extractors for the NFS-e service description.
//!
//! Each rule declares the record field it fills. A [`RuleSet`] runs its rules
//! in order against the description; a rule is skipped once its field holds a
//! value, so the first match for a field wins and rules for different fields
//! never block each other.

pub mod amounts;
pub mod daily_rate;
pub mod patient;
pub mod patterns;
pub mod period;

pub use amounts::{parse_brazilian_amount, DescriptionTotalRule};
pub use daily_rate::{DailyRateQuantityRule, DailyRateUnitValueRule};
pub use patient::PatientNameRule;
pub use period::{month_bounds, month_from_name, MonthYearPeriodRule, ReferencePeriodRule};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::models::record::ExtractedInvoiceRecord;

/// Record field filled by a description rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichedField {
    PatientName,
    DailyRateQuantity,
    DailyRateUnitValue,
    /// Period label, start and end together.
    BillingPeriod,
    TotalValue,
}

impl EnrichedField {
    /// Whether the record already holds a value for this field.
    pub fn is_filled(&self, record: &ExtractedInvoiceRecord) -> bool {
        match self {
            Self::PatientName => record.patient_name.is_some(),
            Self::DailyRateQuantity => record.daily_rate_quantity.is_some(),
            Self::DailyRateUnitValue => record.daily_rate_unit_value.is_some(),
            Self::BillingPeriod => record.period_start.is_some() || record.period_end.is_some(),
            Self::TotalValue => record.total_value.is_some(),
        }
    }
}

/// A billing month resolved from the description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingPeriod {
    /// Matched text, uppercased.
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Value produced by a description rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Enrichment {
    PatientName(String),
    DailyRateQuantity(u32),
    DailyRateUnitValue(Decimal),
    BillingPeriod(BillingPeriod),
    TotalValue(Decimal),
}

impl Enrichment {
    /// Field this value belongs to.
    pub fn field(&self) -> EnrichedField {
        match self {
            Self::PatientName(_) => EnrichedField::PatientName,
            Self::DailyRateQuantity(_) => EnrichedField::DailyRateQuantity,
            Self::DailyRateUnitValue(_) => EnrichedField::DailyRateUnitValue,
            Self::BillingPeriod(_) => EnrichedField::BillingPeriod,
            Self::TotalValue(_) => EnrichedField::TotalValue,
        }
    }

    /// Write the value into the record.
    pub fn apply(self, record: &mut ExtractedInvoiceRecord) {
        match self {
            Self::PatientName(name) => record.patient_name = Some(name),
            Self::DailyRateQuantity(quantity) => record.daily_rate_quantity = Some(quantity),
            Self::DailyRateUnitValue(value) => {
                record.daily_rate_unit_value = Some(value.to_string())
            }
            Self::BillingPeriod(period) => {
                record.billing_period_label = Some(period.label);
                record.period_start = Some(period.start);
                record.period_end = Some(period.end);
            }
            Self::TotalValue(value) => record.total_value = Some(value.to_string()),
        }
    }
}

/// A value matched in the description, with the text it came from.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}

/// A rule that fired during enrichment, with where it matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleMatch {
    pub rule: &'static str,
    /// Matched text.
    pub text: String,
    /// Byte offsets of the match in the description.
    pub span: Option<(usize, usize)>,
}

/// A single heuristic over the service description.
pub trait DescriptionRule: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Field the rule fills.
    fn field(&self) -> EnrichedField;

    /// Look for the field in the description.
    fn extract(&self, description: &str) -> Option<ExtractionMatch<Enrichment>>;
}

/// Ordered list of description rules.
pub struct RuleSet {
    rules: Vec<Box<dyn DescriptionRule>>,
}

impl RuleSet {
    /// An empty rule set.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// The built-in Portuguese heuristics.
    pub fn standard() -> Self {
        Self::empty()
            .with_rule(PatientNameRule)
            .with_rule(DailyRateQuantityRule)
            .with_rule(DailyRateUnitValueRule)
            .with_rule(MonthYearPeriodRule)
            .with_rule(ReferencePeriodRule)
            .with_rule(DescriptionTotalRule)
    }

    /// Append a rule; it runs after the existing ones.
    pub fn with_rule(mut self, rule: impl DescriptionRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule names in evaluation order.
    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Fill record fields from its description.
    ///
    /// Returns the rules that matched, in evaluation order.
    pub fn enrich(&self, record: &mut ExtractedInvoiceRecord) -> Vec<RuleMatch> {
        let Some(description) = record.description.clone() else {
            return Vec::new();
        };

        let mut applied = Vec::new();

        for rule in &self.rules {
            if rule.field().is_filled(record) {
                continue;
            }

            if let Some(found) = rule.extract(&description) {
                debug!(
                    "Rule {} matched {:?} at {:?}",
                    rule.name(),
                    found.source,
                    found.position
                );
                found.value.apply(record);
                applied.push(RuleMatch {
                    rule: rule.name(),
                    text: found.source,
                    span: found.position,
                });
            }
        }

        applied
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}
