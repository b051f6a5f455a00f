//! Core library for invoice line processing.
//!
//! This crate provides:
//! - Line classification (section headers, document metadata, noise lines)
//! - Product line parsing with packet quantities
//! - Price validation and partitioning into items, skipped and mismatched lines
//! - Report assembly (items, per-section bill summary, warnings)
//! - PDF text line extraction

pub mod error;
pub mod invoice;
pub mod models;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod report;
pub mod source;

pub use error::{BillError, LineError, PdfError, Result};
pub use invoice::{
    parse_product_line, BillProcessor, LineClassifier, LineOutcome, ProcessedDocument,
    TableBuilder,
};
pub use models::config::{BillConfig, ClassifierConfig, ExportConfig};
pub use models::document::{
    ClassifiedDocument, DocumentMetadata, ItemTable, LineRecord, MetadataField, MismatchedLine,
    ProcessingResult,
};
pub use models::item::{ParsedItem, ProductLine, Validation, ITEM_COLUMNS, UNKNOWN};
#[cfg(feature = "pdf")]
pub use pdf::{PdfExtractor, PdfProcessor};
pub use report::{Report, SummaryRow, WarningKind, WarningRow};
pub use source::{LineSource, TextLines};
