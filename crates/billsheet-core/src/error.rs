//! Error types for the billsheet-core library.
//!
//! Lines that fail the product grammar or the price check do not abort
//! processing; they are reported through [`ProcessingResult`](crate::ProcessingResult).

use thiserror::Error;

/// Main error type for the billsheet library.
#[derive(Error, Debug)]
pub enum BillError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// A configured pattern failed to compile.
    #[error("invalid {name} pattern: {source}")]
    Pattern {
        name: &'static str,
        #[source]
        source: regex::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Why a single text line did not become a product line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    /// The line does not fit the product line grammar.
    #[error("not a product line")]
    NoMatch,

    /// The line fits the grammar but a value cannot be represented.
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: String },
}

/// Result type for the billsheet library.
pub type Result<T> = std::result::Result<T, BillError>;
