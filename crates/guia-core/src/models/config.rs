//! Configuration structures for extraction and TISS generation.

use serde::{Deserialize, Serialize};

use crate::error::{GuiaError, Result};

/// Main configuration for the guia pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuiaConfig {
    /// NFS-e extraction configuration.
    pub extraction: ExtractionConfig,

    /// TISS document configuration.
    pub tiss: TissConfig,
}

/// What to do when the NFS-e carries no issue date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueDatePolicy {
    /// Leave the issue date empty.
    #[default]
    Absent,
    /// Use the current date.
    Today,
}

/// NFS-e extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Handling of a missing issue date.
    pub issue_date_policy: IssueDatePolicy,

    /// Search the whole document for the provider tax id when no provider block exists.
    pub document_fallback: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            issue_date_policy: IssueDatePolicy::Absent,
            document_fallback: true,
        }
    }
}

/// Constants and defaults written into the TISS document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TissConfig {
    /// ANS registry number of the health plan operator.
    pub registro_ans: String,

    /// Provider CNES code.
    pub cnes: String,

    /// Transaction type in the message header.
    pub transaction_type: String,

    /// Batch number (numeroLote).
    pub batch_number: String,

    /// Guide number used when the NFS-e has no number.
    pub default_guide_number: String,

    /// TUSS table of the billed procedure.
    pub procedure_table: String,

    /// Procedure code when the operator leaves it blank.
    pub default_procedure_code: String,

    /// Procedure description written next to the code.
    pub procedure_description: String,

    /// Beneficiary name when the description has none.
    pub patient_sentinel: String,

    /// Provider name when the NFS-e has none.
    pub provider_sentinel: String,

    /// Observation text when the NFS-e has no description.
    pub default_observation: String,

    /// Maximum observation length, in characters.
    pub observation_max_chars: usize,
}

impl Default for TissConfig {
    fn default() -> Self {
        Self {
            registro_ans: "000000".to_string(),
            cnes: "0000000".to_string(),
            transaction_type: "ENVIO_LOTE_GUIAS".to_string(),
            batch_number: "1".to_string(),
            default_guide_number: "1".to_string(),
            procedure_table: "18".to_string(),
            default_procedure_code: "60000775".to_string(),
            procedure_description: "DIARIA".to_string(),
            patient_sentinel: "NAO INFORMADO".to_string(),
            provider_sentinel: "PRESTADOR".to_string(),
            default_observation: "FATURAMENTO REFERENTE A NFS-E DE INTERNACAO".to_string(),
            observation_max_chars: 500,
        }
    }
}

impl GuiaConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| GuiaError::Config(e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| GuiaError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
