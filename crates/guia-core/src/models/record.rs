//! Invoice record produced by NFS-e extraction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fields extracted from an NFS-e document.
///
/// Every field is either populated or `None`. Placeholders and defaults are
/// only applied when the TISS document is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedInvoiceRecord {
    /// Service provider CNPJ/CPF, as found in the document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_tax_id: Option<String>,

    /// Service client CNPJ/CPF, as found in the document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_tax_id: Option<String>,

    /// Free-text service description (Discriminacao).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Original document text.
    #[serde(default)]
    pub raw_source: String,

    /// NFS-e number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,

    /// Provider legal name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,

    /// Date the NFS-e was issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,

    /// Total service value as a dot-decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_value: Option<String>,

    /// Patient name mined from the description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,

    /// Billing reference as written in the description (e.g. "DEZEMBRO DE 2024").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_period_label: Option<String>,

    /// Number of daily rates billed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_rate_quantity: Option<u32>,

    /// Value of a single daily rate as a dot-decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_rate_unit_value: Option<String>,

    /// First day of the billing period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_start: Option<NaiveDate>,

    /// Last day of the billing period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_end: Option<NaiveDate>,
}

impl ExtractedInvoiceRecord {
    /// Create an empty record carrying the original document text.
    pub fn from_source(raw_source: impl Into<String>) -> Self {
        Self {
            raw_source: raw_source.into(),
            ..Self::default()
        }
    }

    /// Names of the structural fields that extraction left empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let checks: [(&'static str, bool); 7] = [
            ("provider_tax_id", self.provider_tax_id.is_none()),
            ("client_tax_id", self.client_tax_id.is_none()),
            ("invoice_number", self.invoice_number.is_none()),
            ("provider_name", self.provider_name.is_none()),
            ("description", self.description.is_none()),
            ("total_value", self.total_value.is_none()),
            ("issue_date", self.issue_date.is_none()),
        ];

        checks
            .into_iter()
            .filter(|(_, missing)| *missing)
            .map(|(name, _)| name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_on_empty_record() {
        let record = ExtractedInvoiceRecord::from_source("<x/>");
        assert_eq!(record.raw_source, "<x/>");
        assert_eq!(record.missing_fields().len(), 7);
    }

    #[test]
    fn test_serialization_skips_absent_fields() {
        let record = ExtractedInvoiceRecord {
            patient_name: Some("MARIA".to_string()),
            ..Default::default()
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["patient_name"], "MARIA");
        assert!(json.get("provider_tax_id").is_none());

        let back: ExtractedInvoiceRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
