//! Document metadata extraction (invoice number, quote date, parties).

use regex::Regex;

use super::FieldExtractor;
use crate::error::{BillError, Result};
use crate::models::config::ClassifierConfig;
use crate::models::document::MetadataField;

/// Searches a line for one metadata field. The first capture group is the value.
#[derive(Debug, Clone)]
pub struct MetadataExtractor {
    field: MetadataField,
    pattern: Regex,
}

impl MetadataExtractor {
    /// Compile an extractor. The pattern must have at least one capture group.
    pub fn new(field: MetadataField, pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|source| BillError::Pattern {
            name: field.name(),
            source,
        })?;

        if pattern.captures_len() < 2 {
            return Err(BillError::Config(format!(
                "{} pattern has no capture group: {}",
                field.name(),
                pattern.as_str()
            )));
        }

        Ok(Self { field, pattern })
    }

    /// Build the four extractors from a classifier configuration.
    pub fn all_from_config(config: &ClassifierConfig) -> Result<Vec<Self>> {
        MetadataField::ALL
            .iter()
            .map(|&field| {
                let pattern = match field {
                    MetadataField::InvoiceNumber => &config.invoice_number_pattern,
                    MetadataField::QuoteDate => &config.quote_date_pattern,
                    MetadataField::SoldTo => &config.sold_to_pattern,
                    MetadataField::ShipTo => &config.ship_to_pattern,
                };
                Self::new(field, pattern)
            })
            .collect()
    }

    pub fn field(&self) -> MetadataField {
        self.field
    }
}

impl FieldExtractor for MetadataExtractor {
    type Output = String;

    /// Value of the first match in `text`. An empty capture counts as no match.
    fn extract(&self, text: &str) -> Option<String> {
        let caps = self.pattern.captures(text)?;
        let value = caps.get(1)?.as_str().trim();
        (!value.is_empty()).then(|| value.to_string())
    }
}
