//! Error types for the guia-core library.

use thiserror::Error;

/// Main error type for the guia library.
#[derive(Error, Debug)]
pub enum GuiaError {
    /// The source document could not be interpreted.
    #[error("document could not be interpreted: {0}")]
    Parse(#[from] ParseError),

    /// Writing the TISS document failed.
    #[error("failed to serialize document: {0}")]
    Serialize(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// The single failure class at the parse boundary.
///
/// Every other missing-data case is absorbed by defaults during generation.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Nothing but whitespace was supplied.
    #[error("input is empty")]
    Empty,

    /// The text is not well-formed XML.
    #[error("malformed XML: {0}")]
    Malformed(#[from] roxmltree::Error),
}

/// Result type for the guia library.
pub type Result<T> = std::result::Result<T, GuiaError>;
