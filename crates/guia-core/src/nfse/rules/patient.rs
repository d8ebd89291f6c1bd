//! Patient name extraction.

use super::patterns::PATIENT_NAME;
use super::{DescriptionRule, EnrichedField, Enrichment, ExtractionMatch};

/// Text after a "Paciente" label, up to the end of the line.
pub struct PatientNameRule;

impl DescriptionRule for PatientNameRule {
    fn name(&self) -> &'static str {
        "patient_name"
    }

    fn field(&self) -> EnrichedField {
        EnrichedField::PatientName
    }

    fn extract(&self, description: &str) -> Option<ExtractionMatch<Enrichment>> {
        let caps = PATIENT_NAME.captures(description)?;
        let name = caps[1].trim();
        if name.is_empty() {
            return None;
        }

        let full_match = caps.get(0)?;
        Some(
            ExtractionMatch::new(Enrichment::PatientName(name.to_string()), full_match.as_str())
                .with_position(full_match.start(), full_match.end()),
        )
    }
}
