//! Document-level models: classified lines, metadata and processing results.

use serde::Serialize;

use super::item::{ParsedItem, ITEM_COLUMNS, UNKNOWN};

/// A line eligible for product parsing, with the section it falls under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineRecord {
    pub text: String,
    pub section: Option<String>,
}

impl LineRecord {
    pub fn new(text: impl Into<String>, section: Option<String>) -> Self {
        Self {
            text: text.into(),
            section,
        }
    }
}

/// Document metadata fields captured by the line classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataField {
    InvoiceNumber,
    QuoteDate,
    SoldTo,
    ShipTo,
}

impl MetadataField {
    pub const ALL: [MetadataField; 4] = [
        MetadataField::InvoiceNumber,
        MetadataField::QuoteDate,
        MetadataField::SoldTo,
        MetadataField::ShipTo,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MetadataField::InvoiceNumber => "invoice_number",
            MetadataField::QuoteDate => "quote_date",
            MetadataField::SoldTo => "sold_to",
            MetadataField::ShipTo => "ship_to",
        }
    }
}

/// Header data of one invoice document. Each field is set at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sold_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship_to: Option<String>,
}

impl DocumentMetadata {
    pub fn get(&self, field: MetadataField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    pub fn is_set(&self, field: MetadataField) -> bool {
        self.slot(field).is_some()
    }

    /// Store `value` unless the field already holds one. Returns whether it was stored.
    pub fn set_if_absent(&mut self, field: MetadataField, value: impl Into<String>) -> bool {
        let slot = self.slot_mut(field);
        if slot.is_some() {
            return false;
        }
        *slot = Some(value.into());
        true
    }

    /// Field value, or the `UNKNOWN` sentinel when it was never found.
    pub fn or_unknown(&self, field: MetadataField) -> String {
        self.get(field).unwrap_or(UNKNOWN).to_string()
    }

    fn slot(&self, field: MetadataField) -> &Option<String> {
        match field {
            MetadataField::InvoiceNumber => &self.invoice_number,
            MetadataField::QuoteDate => &self.quote_date,
            MetadataField::SoldTo => &self.sold_to,
            MetadataField::ShipTo => &self.ship_to,
        }
    }

    fn slot_mut(&mut self, field: MetadataField) -> &mut Option<String> {
        match field {
            MetadataField::InvoiceNumber => &mut self.invoice_number,
            MetadataField::QuoteDate => &mut self.quote_date,
            MetadataField::SoldTo => &mut self.sold_to,
            MetadataField::ShipTo => &mut self.ship_to,
        }
    }
}

/// Output of the line classifier for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassifiedDocument {
    pub metadata: DocumentMetadata,
    pub lines: Vec<LineRecord>,
}

/// Validated items laid out as a table with a fixed column set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ItemTable {
    rows: Vec<ParsedItem>,
}

impl ItemTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &'static [&'static str] {
        &ITEM_COLUMNS
    }

    pub fn push(&mut self, item: ParsedItem) {
        self.rows.push(item);
    }

    pub fn rows(&self) -> &[ParsedItem] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as cell strings, in column order.
    pub fn records(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.rows.iter().map(ParsedItem::cells)
    }
}

/// A product line that failed the price check, or whose values are out of range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MismatchedLine {
    pub line: String,
    pub reason: String,
    /// Absent when the line fit the grammar but could not be decoded.
    pub item: Option<ParsedItem>,
}

impl MismatchedLine {
    pub fn from_item(line: impl Into<String>, item: ParsedItem) -> Self {
        Self {
            line: line.into(),
            reason: item.validation.to_string(),
            item: Some(item),
        }
    }
}

/// Partitioned outcome of building the items table for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessingResult {
    /// Items that passed validation, in line order.
    pub items: ItemTable,
    /// Raw text of lines that did not match the product grammar.
    pub skipped: Vec<String>,
    /// Lines whose totals did not reconcile or could not be computed.
    pub mismatched: Vec<MismatchedLine>,
}

impl ProcessingResult {
    /// Number of lines that reached the builder.
    pub fn line_count(&self) -> usize {
        self.items.len() + self.skipped.len() + self.mismatched.len()
    }
}
