//! Product line and parsed item models.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

/// Section name used on items whose line appeared before any section header.
pub const UNKNOWN_SECTION: &str = "Unknown";

/// Value merged into an item for each document metadata field that was never found.
pub const UNKNOWN: &str = "UNKNOWN";

/// Column names of the items table, in output order.
pub const ITEM_COLUMNS: [&str; 13] = [
    "Section",
    "Quantity",
    "Product Code",
    "Description",
    "Packet Quantity",
    "Unit Price",
    "Total Price",
    "Unit Price Per Item",
    "Validation",
    "Invoice Number",
    "Quote Date",
    "Sold To",
    "Ship To",
];

/// Fields decoded from a single product line, before validation and metadata merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductLine {
    /// Section the line belongs to.
    #[serde(rename = "Section")]
    pub section: String,

    /// Billed quantity.
    #[serde(rename = "Quantity")]
    pub quantity: u64,

    /// Product code.
    #[serde(rename = "Product Code")]
    pub product_code: String,

    /// Description without the packet quantity suffix.
    #[serde(rename = "Description")]
    pub description: String,

    /// Items per billed unit, from a trailing `(n)` in the description.
    #[serde(rename = "Packet Quantity")]
    pub packet_quantity: Option<u32>,

    /// Price of one billed unit.
    #[serde(rename = "Unit Price")]
    pub unit_price: Decimal,

    /// Stated line total.
    #[serde(rename = "Total Price")]
    pub total_price: Decimal,

    /// Unit price divided by packet quantity, rounded to cents.
    #[serde(rename = "Unit Price Per Item")]
    pub unit_price_per_item: Option<Decimal>,
}

impl ProductLine {
    /// Render the line back into the document's product line layout.
    pub fn to_line(&self) -> String {
        let description = match self.packet_quantity {
            Some(packet) if self.description.is_empty() => format!("({})", packet),
            Some(packet) => format!("{} ({})", self.description, packet),
            None => self.description.clone(),
        };

        format!(
            "{} {} {} {} {}",
            self.quantity, self.product_code, description, self.unit_price, self.total_price
        )
    }
}

/// Outcome of the price check on a parsed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// Quantity × unit price agrees with the total price.
    Ok,
    /// The stated total differs from the expected total beyond tolerance.
    Mismatch { expected: Decimal, total: Decimal },
    /// Quantity × unit price does not fit a `Decimal`.
    OutOfRange,
}

impl Validation {
    pub fn is_ok(&self) -> bool {
        matches!(self, Validation::Ok)
    }
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validation::Ok => f.write_str("OK"),
            Validation::Mismatch { expected, total } => write!(
                f,
                "Mismatch: {} ≠ {}",
                natural_decimal(*expected),
                natural_decimal(*total)
            ),
            Validation::OutOfRange => f.write_str("Mismatch: Quantity × Unit Price out of range"),
        }
    }
}

impl Serialize for Validation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A validated product line with document metadata attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedItem {
    #[serde(flatten)]
    pub line: ProductLine,

    #[serde(rename = "Validation")]
    pub validation: Validation,

    #[serde(rename = "Invoice Number")]
    pub invoice_number: String,

    #[serde(rename = "Quote Date")]
    pub quote_date: String,

    #[serde(rename = "Sold To")]
    pub sold_to: String,

    #[serde(rename = "Ship To")]
    pub ship_to: String,
}

impl ParsedItem {
    /// Cell values in [`ITEM_COLUMNS`] order. Absent optional fields are empty.
    pub fn cells(&self) -> Vec<String> {
        let line = &self.line;
        vec![
            line.section.clone(),
            line.quantity.to_string(),
            line.product_code.clone(),
            line.description.clone(),
            line.packet_quantity.map(|p| p.to_string()).unwrap_or_default(),
            line.unit_price.to_string(),
            line.total_price.to_string(),
            line.unit_price_per_item.map(|p| p.to_string()).unwrap_or_default(),
            self.validation.to_string(),
            self.invoice_number.clone(),
            self.quote_date.clone(),
            self.sold_to.clone(),
            self.ship_to.clone(),
        ]
    }
}

/// Format a decimal without trailing fractional zeros, keeping at least one
/// fractional digit (`15.00` -> `15.0`, `2.50` -> `2.5`).
pub fn natural_decimal(value: Decimal) -> String {
    let text = value.normalize().to_string();
    if text.contains('.') {
        text
    } else {
        format!("{}.0", text)
    }
}
