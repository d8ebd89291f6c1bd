//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod convert;
pub mod inspect;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Args;
use tracing::debug;

use guia_core::{GuiaConfig, GuideType, ManualOverride};

/// Operator fields merged into the generated guide.
#[derive(Args, Debug, Clone)]
pub struct OverrideArgs {
    /// Provider code at the health plan operator
    #[arg(long, default_value = "")]
    provider_code: String,

    /// Beneficiary card number (punctuation is stripped)
    #[arg(long, default_value = "")]
    card: String,

    /// Guide type (internment-summary or sadt)
    #[arg(long, default_value = "internment-summary")]
    guide_type: GuideType,

    /// Billing period start (YYYY-MM-DD), used when the description has none
    #[arg(long)]
    period_start: Option<NaiveDate>,

    /// Billing period end (YYYY-MM-DD), used when the description has none
    #[arg(long)]
    period_end: Option<NaiveDate>,

    /// Procedure code (default: daily rate 60000775)
    #[arg(long)]
    procedure_code: Option<String>,
}

impl OverrideArgs {
    pub fn into_override(self) -> anyhow::Result<ManualOverride> {
        if let (Some(start), Some(end)) = (self.period_start, self.period_end) {
            if start > end {
                anyhow::bail!("Period start {} is after period end {}", start, end);
            }
        }

        Ok(ManualOverride {
            provider_code: self.provider_code,
            member_card_number: self.card,
            guide_type: self.guide_type,
            period_start: self.period_start,
            period_end: self.period_end,
            procedure_code: self.procedure_code,
        })
    }
}

/// Location of the user configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("guia")
        .join("config.json")
}

/// Load the explicit config file, else the user file if present, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<GuiaConfig> {
    if let Some(path) = config_path {
        return Ok(GuiaConfig::from_file(Path::new(path))?);
    }

    let user_path = default_config_path();
    if user_path.exists() {
        debug!("Using configuration from {}", user_path.display());
        return Ok(GuiaConfig::from_file(&user_path)?);
    }

    Ok(GuiaConfig::default())
}
