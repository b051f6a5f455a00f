//! Report assembly across documents: items, per-section bill summary and warnings.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use crate::invoice::ProcessedDocument;
use crate::models::document::{ItemTable, ProcessingResult};

/// Column names of the bill summary sheet.
pub const SUMMARY_COLUMNS: [&str; 5] = [
    "Invoice Number",
    "Quote Date",
    "Sold To",
    "Section",
    "Total Price",
];

/// Column names of the warnings sheet.
pub const WARNING_COLUMNS: [&str; 3] = ["Type", "Line Text", "Details"];

/// Details text of a skipped-line warning.
pub const SKIPPED_DETAILS: &str = "Could not parse";

/// Cell text of a total that does not fit a `Decimal`.
pub const OUT_OF_RANGE: &str = "out of range";

/// Sum of valid line totals for one section of one document.
///
/// `total_price` is `None` when the sum does not fit a `Decimal`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    #[serde(rename = "Invoice Number")]
    pub invoice_number: String,
    #[serde(rename = "Quote Date")]
    pub quote_date: String,
    #[serde(rename = "Sold To")]
    pub sold_to: String,
    #[serde(rename = "Section")]
    pub section: String,
    #[serde(rename = "Total Price")]
    pub total_price: Option<Decimal>,
}

impl SummaryRow {
    pub fn cells(&self) -> Vec<String> {
        vec![
            self.invoice_number.clone(),
            self.quote_date.clone(),
            self.sold_to.clone(),
            self.section.clone(),
            self.total_price
                .map(|total| total.to_string())
                .unwrap_or_else(|| OUT_OF_RANGE.to_string()),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WarningKind {
    Skipped,
    Mismatch,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningKind::Skipped => f.write_str("Skipped"),
            WarningKind::Mismatch => f.write_str("Mismatch"),
        }
    }
}

/// A line the user should look at, with a readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WarningRow {
    #[serde(rename = "Type")]
    pub kind: WarningKind,
    #[serde(rename = "Line Text")]
    pub line: String,
    #[serde(rename = "Details")]
    pub details: String,
}

impl WarningRow {
    pub fn cells(&self) -> Vec<String> {
        vec![self.kind.to_string(), self.line.clone(), self.details.clone()]
    }
}

/// Group valid items by (section, invoice, quote date, sold to) and sum their totals.
///
/// Groups come out sorted by key, section first.
pub fn summarize(result: &ProcessingResult) -> Vec<SummaryRow> {
    let mut groups: BTreeMap<(&str, &str, &str, &str), Option<Decimal>> = BTreeMap::new();

    for item in result.items.rows() {
        let key = (
            item.line.section.as_str(),
            item.invoice_number.as_str(),
            item.quote_date.as_str(),
            item.sold_to.as_str(),
        );
        let total = groups.entry(key).or_insert(Some(Decimal::ZERO));
        *total = total.and_then(|sum| sum.checked_add(item.line.total_price));
    }

    groups
        .into_iter()
        .map(|((section, invoice_number, quote_date, sold_to), total_price)| {
            if total_price.is_none() {
                warn!("Total Price of {} / {} is out of range", invoice_number, section);
            }
            SummaryRow {
                invoice_number: invoice_number.to_string(),
                quote_date: quote_date.to_string(),
                sold_to: sold_to.to_string(),
                section: section.to_string(),
                total_price,
            }
        })
        .collect()
}

/// Warning rows for one document: skipped lines first, then mismatches.
pub fn warnings(result: &ProcessingResult) -> Vec<WarningRow> {
    let skipped = result.skipped.iter().map(|line| WarningRow {
        kind: WarningKind::Skipped,
        line: line.clone(),
        details: SKIPPED_DETAILS.to_string(),
    });

    let mismatched = result.mismatched.iter().map(|m| WarningRow {
        kind: WarningKind::Mismatch,
        line: m.line.clone(),
        details: m.reason.clone(),
    });

    skipped.chain(mismatched).collect()
}

/// Combined report over any number of documents, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    items: ItemTable,
    summary: Vec<SummaryRow>,
    warnings: Vec<WarningRow>,
    documents: usize,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a report from documents in order.
    pub fn from_documents<'a, I>(documents: I) -> Self
    where
        I: IntoIterator<Item = &'a ProcessedDocument>,
    {
        let mut report = Self::new();
        for doc in documents {
            report.add_document(doc);
        }
        report
    }

    pub fn add_document(&mut self, doc: &ProcessedDocument) {
        for item in doc.result.items.rows() {
            self.items.push(item.clone());
        }
        self.summary.extend(summarize(&doc.result));
        self.warnings.extend(warnings(&doc.result));
        self.documents += 1;
    }

    pub fn items(&self) -> &ItemTable {
        &self.items
    }

    pub fn summary(&self) -> &[SummaryRow] {
        &self.summary
    }

    pub fn warnings(&self) -> &[WarningRow] {
        &self.warnings
    }

    pub fn document_count(&self) -> usize {
        self.documents
    }

    /// Total of all valid items, or `None` when it does not fit a `Decimal`.
    pub fn grand_total(&self) -> Option<Decimal> {
        self.items
            .rows()
            .iter()
            .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.line.total_price))
    }
}
