//! Items table construction and price validation.

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, info};

use super::line_parser::parse_product_line;
use crate::error::LineError;
use crate::models::document::{
    DocumentMetadata, LineRecord, MetadataField, MismatchedLine, ProcessingResult,
};
use crate::models::item::{ParsedItem, ProductLine, Validation};

/// Largest accepted absolute difference between expected and stated totals.
pub fn price_tolerance() -> Decimal {
    Decimal::new(2, 2)
}

/// Check `quantity × unit price` against the stated total.
pub fn validate(line: &ProductLine) -> Validation {
    let Some(product) = Decimal::from(line.quantity).checked_mul(line.unit_price) else {
        return Validation::OutOfRange;
    };
    let expected = product.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);

    if (expected - line.total_price).abs() > price_tolerance() {
        Validation::Mismatch {
            expected,
            total: line.total_price,
        }
    } else {
        Validation::Ok
    }
}

/// What happened to a single line record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Parsed and reconciled.
    Valid(ParsedItem),
    /// Fits the grammar, but the total does not reconcile or a value is out of range.
    Mismatched(MismatchedLine),
    /// Did not match the product line grammar.
    Skipped,
}

/// Builds the items table for one document.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableBuilder;

impl TableBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Parse, validate and partition all line records of a document.
    pub fn build(&self, lines: &[LineRecord], metadata: &DocumentMetadata) -> ProcessingResult {
        let result = lines
            .iter()
            .fold(ProcessingResult::default(), |mut result, record| {
                match self.evaluate(record, metadata) {
                    LineOutcome::Valid(item) => result.items.push(item),
                    LineOutcome::Mismatched(mismatch) => {
                        debug!("Price mismatch ({}): {}", mismatch.reason, record.text);
                        result.mismatched.push(mismatch);
                    }
                    LineOutcome::Skipped => {
                        debug!("Skipped unparseable line: {}", record.text);
                        result.skipped.push(record.text.clone());
                    }
                }
                result
            });

        info!(
            "Built items table: {} valid, {} mismatched, {} skipped",
            result.items.len(),
            result.mismatched.len(),
            result.skipped.len()
        );

        result
    }

    /// Parse and validate a single line record.
    pub fn evaluate(&self, record: &LineRecord, metadata: &DocumentMetadata) -> LineOutcome {
        let line = match parse_product_line(&record.text, record.section.as_deref()) {
            Ok(line) => line,
            Err(LineError::NoMatch) => return LineOutcome::Skipped,
            Err(err) => {
                return LineOutcome::Mismatched(MismatchedLine {
                    line: record.text.clone(),
                    reason: err.to_string(),
                    item: None,
                });
            }
        };

        let validation = validate(&line);
        let item = ParsedItem {
            line,
            validation,
            invoice_number: metadata.or_unknown(MetadataField::InvoiceNumber),
            quote_date: metadata.or_unknown(MetadataField::QuoteDate),
            sold_to: metadata.or_unknown(MetadataField::SoldTo),
            ship_to: metadata.or_unknown(MetadataField::ShipTo),
        };

        if validation.is_ok() {
            LineOutcome::Valid(item)
        } else {
            LineOutcome::Mismatched(MismatchedLine::from_item(record.text.clone(), item))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn record(text: &str, section: Option<&str>) -> LineRecord {
        LineRecord::new(text, section.map(str::to_string))
    }

    fn metadata() -> DocumentMetadata {
        DocumentMetadata {
            invoice_number: Some("5012345".to_string()),
            quote_date: Some("3/14/2024".to_string()),
            sold_to: None,
            ship_to: Some("Corner Market DC".to_string()),
        }
    }

    #[test]
    fn test_valid_line_with_metadata() {
        let lines = [record("2 ABC12 WIDGET SMALL (10) 1.00 2.00", Some("Frozen"))];
        let result = TableBuilder::new().build(&lines, &metadata());

        assert_eq!(result.items.len(), 1);
        let item = &result.items.rows()[0];
        assert_eq!(item.validation, Validation::Ok);
        assert_eq!(item.validation.to_string(), "OK");
        assert_eq!(item.line.unit_price_per_item, Some(dec("0.10")));
        assert_eq!(item.invoice_number, "5012345");
        assert_eq!(item.quote_date, "3/14/2024");
        assert_eq!(item.sold_to, "UNKNOWN");
        assert_eq!(item.ship_to, "Corner Market DC");
        assert!(result.skipped.is_empty());
        assert!(result.mismatched.is_empty());
    }

    #[test]
    fn test_mismatch_is_kept_with_reason() {
        let lines = [record("3 XYZ99 GADGET 5.00 14.00", None)];
        let result = TableBuilder::new().build(&lines, &DocumentMetadata::default());

        assert!(result.items.is_empty());
        assert_eq!(result.mismatched.len(), 1);

        let mismatch = &result.mismatched[0];
        assert_eq!(mismatch.line, "3 XYZ99 GADGET 5.00 14.00");
        assert_eq!(mismatch.reason, "Mismatch: 15.0 ≠ 14.0");

        let item = mismatch.item.as_ref().unwrap();
        assert_eq!(item.line.section, "Unknown");
        assert_eq!(item.invoice_number, "UNKNOWN");
    }

    #[test]
    fn test_overflowing_product_is_a_mismatch() {
        let text = "18446744073709551615 ABCDE BULK 99999999999.00 1.00";
        let result = TableBuilder::new().build(&[record(text, None)], &DocumentMetadata::default());

        assert!(result.items.is_empty());
        assert!(result.skipped.is_empty());
        assert_eq!(result.mismatched.len(), 1);

        let mismatch = &result.mismatched[0];
        assert_eq!(mismatch.line, text);
        assert_eq!(mismatch.reason, "Mismatch: Quantity × Unit Price out of range");
        assert_eq!(
            mismatch.item.as_ref().map(|i| i.validation),
            Some(Validation::OutOfRange)
        );
    }

    #[test]
    fn test_out_of_range_value_is_a_mismatch() {
        let text = "99999999999999999999 ABCDE BULK 1.00 1.00";
        let result = TableBuilder::new().build(&[record(text, Some("Grocery"))], &metadata());

        assert!(result.skipped.is_empty());
        assert_eq!(
            result.mismatched,
            vec![MismatchedLine {
                line: text.to_string(),
                reason: "Quantity out of range: 99999999999999999999".to_string(),
                item: None,
            }]
        );
    }

    #[test]
    fn test_tolerance_is_absolute_and_inclusive() {
        let within = parse_product_line("3 XYZ99 GADGET 3.33 10.01", None).unwrap();
        assert_eq!(validate(&within), Validation::Ok);

        let edge = parse_product_line("1 XYZ99 GADGET 2.00 2.02", None).unwrap();
        assert_eq!(validate(&edge), Validation::Ok);

        let beyond = parse_product_line("1 XYZ99 GADGET 2.00 2.03", None).unwrap();
        assert_eq!(
            validate(&beyond),
            Validation::Mismatch {
                expected: dec("2.00"),
                total: dec("2.03")
            }
        );

        let large = parse_product_line("1000 XYZ99 GADGET 10.00 10000.03", None).unwrap();
        assert!(!validate(&large).is_ok());
    }

    #[test]
    fn test_partition_preserves_order() {
        let lines = [
            record("not a product line", None),
            record("1 AAAAA FIRST 1.00 1.00", Some("Grocery")),
            record("3 XYZ99 GADGET 5.00 14.00", Some("Grocery")),
            record("SUBTOTAL 99.00", Some("Grocery")),
            record("2 BBBBB SECOND 2.00 4.00", Some("Grocery")),
            record("1 CCCCC THIRD 1.00 9.00", Some("Grocery")),
        ];
        let result = TableBuilder::new().build(&lines, &metadata());

        let codes: Vec<&str> = result
            .items
            .rows()
            .iter()
            .map(|i| i.line.product_code.as_str())
            .collect();
        assert_eq!(codes, vec!["AAAAA", "BBBBB"]);
        assert_eq!(result.skipped, vec!["not a product line", "SUBTOTAL 99.00"]);

        let mismatched: Vec<&str> = result.mismatched.iter().map(|m| m.line.as_str()).collect();
        assert_eq!(
            mismatched,
            vec!["3 XYZ99 GADGET 5.00 14.00", "1 CCCCC THIRD 1.00 9.00"]
        );
        assert_eq!(result.line_count(), lines.len());
    }

    #[test]
    fn test_ok_items_satisfy_tolerance() {
        let lines: Vec<LineRecord> = [
            "7 PPPPP A 1.43 10.01",
            "7 PPPPP B 1.43 10.05",
            "12 PPPPP C (6) 2.99 35.88",
            "5 PPPPP D 0.99 4.97",
            "5 PPPPP E 0.99 4.93",
        ]
        .iter()
        .map(|t| record(t, None))
        .collect();
        let result = TableBuilder::new().build(&lines, &DocumentMetadata::default());

        for item in result.items.rows() {
            let line = &item.line;
            let diff = (Decimal::from(line.quantity) * line.unit_price - line.total_price).abs();
            assert!(diff <= price_tolerance(), "{:?}", line);
        }
        for mismatch in &result.mismatched {
            assert!(!mismatch.item.as_ref().unwrap().validation.is_ok());
        }
        assert_eq!(result.items.len() + result.mismatched.len(), lines.len());
    }

    #[test]
    fn test_build_is_idempotent() {
        let lines = [
            record("2 ABC12 WIDGET SMALL (10) 1.00 2.00", Some("Frozen")),
            record("3 XYZ99 GADGET 5.00 14.00", Some("Frozen")),
            record("not a product line", None),
        ];
        let builder = TableBuilder::new();

        let first = builder.build(&lines, &metadata());
        let second = builder.build(&lines, &metadata());
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_input() {
        let result = TableBuilder::new().build(&[], &DocumentMetadata::default());

        assert!(result.items.is_empty());
        assert_eq!(result.items.columns().len(), 13);
        assert!(result.skipped.is_empty());
        assert!(result.mismatched.is_empty());
    }
}
