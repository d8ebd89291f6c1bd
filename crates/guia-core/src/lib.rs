//! Core library for NFS-e to TISS conversion.
//!
//! This crate provides:
//! - Namespace-tolerant extraction of NFS-e service invoices (any vendor prefix)
//! - Heuristic mining of the free-text service description (patient, daily rates, billing period)
//! - Assembly of a TISS 4.01.00 internment-summary guide with an MD5 epilogue

pub mod clock;
pub mod error;
pub mod models;
pub mod nfse;
pub mod tiss;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{GuiaError, ParseError, Result};
pub use models::config::{ExtractionConfig, GuiaConfig, IssueDatePolicy, TissConfig};
pub use models::manual::{GuideType, ManualOverride};
pub use models::record::ExtractedInvoiceRecord;
pub use nfse::{ExtractionResult, InvoiceParser, NfseParser};
pub use tiss::{TissDocument, TissGenerator};

/// Parse an NFS-e document with the default configuration.
pub fn parse_nfse(source: &str) -> std::result::Result<ExtractionResult, ParseError> {
    NfseParser::new().parse(source)
}

/// Generate a sealed TISS document with the default configuration and the system clock.
pub fn generate_tiss(record: &ExtractedInvoiceRecord, manual: &ManualOverride) -> Result<String> {
    TissGenerator::new()
        .generate(record, manual)
        .map(|doc| doc.xml)
}
