//! Value formatting for TISS fields.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

lazy_static! {
    static ref LINE_BREAKS: Regex = Regex::new(r"[\r\n]+").unwrap();
}

/// Keep only ASCII digits (CNPJ, CPF, card numbers).
pub fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Format a currency value with exactly two fractional digits.
///
/// Accepts dot-decimal ("1234.5") and Brazilian notation ("1.234,50").
/// Missing, unparsable and negative values become "0.00".
pub fn format_currency(value: Option<&str>) -> String {
    let amount = value.and_then(parse_amount).unwrap_or(Decimal::ZERO);
    let amount = if amount.is_sign_negative() {
        Decimal::ZERO
    } else {
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    };
    format!("{:.2}", amount)
}

fn parse_amount(value: &str) -> Option<Decimal> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let normalized = if value.contains(',') {
        value.replace('.', "").replace(',', ".")
    } else {
        value.to_string()
    };

    Decimal::from_str(&normalized).ok()
}

/// Description as a single line, cut to `max_chars` characters.
///
/// Returns `None` when nothing but whitespace is left.
pub fn observation_text(description: Option<&str>, max_chars: usize) -> Option<String> {
    let single_line = LINE_BREAKS.replace_all(description?, " ");
    let trimmed = single_line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let truncated: String = trimmed.chars().take(max_chars).collect();
    Some(truncated.trim_end().to_string())
}
