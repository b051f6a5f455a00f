//! Invoice line pipeline: classification, product line parsing and validation.

mod classifier;
mod line_parser;
pub mod rules;
mod table;

pub use classifier::LineClassifier;
pub use line_parser::parse_product_line;
pub use table::{price_tolerance, validate, LineOutcome, TableBuilder};

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::models::config::ClassifierConfig;
use crate::models::document::{DocumentMetadata, ProcessingResult};
use crate::source::LineSource;

/// Metadata and partitioned lines of one processed document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessedDocument {
    pub metadata: DocumentMetadata,
    pub result: ProcessingResult,
}

/// Runs the classifier and the table builder over whole documents.
#[derive(Debug, Clone, Default)]
pub struct BillProcessor {
    classifier: LineClassifier,
    builder: TableBuilder,
}

impl BillProcessor {
    /// Create a processor for the built-in invoice template.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a processor from classifier configuration.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        Ok(Self {
            classifier: LineClassifier::from_config(config)?,
            builder: TableBuilder::new(),
        })
    }

    /// Process the raw lines of one document.
    pub fn process_lines<I, S>(&self, lines: I) -> ProcessedDocument
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let classified = self.classifier.classify(lines);
        let result = self.builder.build(&classified.lines, &classified.metadata);

        info!(
            "Processed document {}: {} candidate lines",
            classified
                .metadata
                .invoice_number
                .as_deref()
                .unwrap_or("(no invoice number)"),
            classified.lines.len()
        );

        ProcessedDocument {
            metadata: classified.metadata,
            result,
        }
    }

    /// Pull lines from a source and process them.
    pub fn process_source(&self, source: &dyn LineSource) -> Result<ProcessedDocument> {
        let lines = source.lines()?;
        Ok(self.process_lines(&lines))
    }
}
