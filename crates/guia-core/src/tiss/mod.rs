//! TISS 4.01.00 document generation.

pub mod builder;
pub mod format;
pub mod hash;
pub mod tree;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::models::config::TissConfig;
use crate::models::manual::ManualOverride;
use crate::models::record::ExtractedInvoiceRecord;
use builder::DocumentBuilder;
use tree::Element;

pub const ANS_PREFIX: &str = "ans";
pub const ANS_NAMESPACE: &str = "http://www.ans.gov.br/padroes/tiss/schemas";
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const SCHEMA_LOCATION: &str = "http://www.ans.gov.br/padroes/tiss/schemas http://www.ans.gov.br/padroes/tiss/schemas/tissV4_01_00.xsd";
pub const SCHEMA_VERSION: &str = "4.01.00";

/// A serialized TISS message and the hash stored in its epilogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TissDocument {
    pub xml: String,
    pub hash: String,
}

/// Generates TISS messages from extracted records.
pub struct TissGenerator<C: Clock = SystemClock> {
    config: TissConfig,
    clock: C,
}

impl TissGenerator<SystemClock> {
    pub fn new() -> Self {
        Self {
            config: TissConfig::default(),
            clock: SystemClock,
        }
    }
}

impl Default for TissGenerator<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> TissGenerator<C> {
    pub fn with_config(mut self, config: TissConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the clock used for header timestamps.
    pub fn with_clock<D: Clock>(self, clock: D) -> TissGenerator<D> {
        TissGenerator {
            config: self.config,
            clock,
        }
    }

    pub fn config(&self) -> &TissConfig {
        &self.config
    }

    /// The message tree without the epilogue.
    pub fn build_tree(&self, record: &ExtractedInvoiceRecord, manual: &ManualOverride) -> Element {
        DocumentBuilder::new(&self.config, self.clock.now()).build(record, manual)
    }

    /// Build, hash and serialize the full message.
    ///
    /// Any record and override produce a document; the only error is a
    /// writer failure.
    pub fn generate(
        &self,
        record: &ExtractedInvoiceRecord,
        manual: &ManualOverride,
    ) -> Result<TissDocument> {
        let document = hash::seal(self.build_tree(record, manual))?;
        info!("Generated TISS document with hash {}", document.hash);
        Ok(document)
    }
}
