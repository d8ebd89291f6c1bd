//! Operator-supplied data that the NFS-e does not carry.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// TISS guide type requested by the operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GuideType {
    /// SP/SADT guide. Not built; generation falls back to an internment summary.
    Sadt,
    /// Internment summary guide (guiaResumoInternacao).
    #[default]
    InternmentSummary,
}

impl GuideType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sadt => "SADT",
            Self::InternmentSummary => "INTERNMENT_SUMMARY",
        }
    }
}

impl fmt::Display for GuideType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GuideType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "SADT" => Ok(Self::Sadt),
            "INTERNMENT_SUMMARY" | "RESUMO_INTERNACAO" => Ok(Self::InternmentSummary),
            other => Err(format!("unknown guide type: {}", other)),
        }
    }
}

/// Manual fields typed in by the operator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManualOverride {
    /// Provider code at the health plan operator.
    pub provider_code: String,

    /// Beneficiary card number, punctuation allowed.
    pub member_card_number: String,

    /// Requested guide type.
    pub guide_type: GuideType,

    /// Billing period start, used when the description has none.
    pub period_start: Option<NaiveDate>,

    /// Billing period end, used when the description has none.
    pub period_end: Option<NaiveDate>,

    /// Procedure code; blank means the default daily-rate code.
    pub procedure_code: Option<String>,
}

impl ManualOverride {
    /// Procedure code if the operator typed a non-blank one.
    pub fn procedure_code(&self) -> Option<&str> {
        self.procedure_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }
}
