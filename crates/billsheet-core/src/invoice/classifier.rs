//! Line classification: metadata capture, section tracking and noise removal.

use regex::Regex;
use tracing::debug;

use super::rules::{section_header, FieldExtractor, MetadataExtractor};
use crate::error::{BillError, Result};
use crate::models::config::ClassifierConfig;
use crate::models::document::{ClassifiedDocument, DocumentMetadata, LineRecord};

/// Splits a document's raw lines into metadata and product line candidates.
///
/// The classifier is immutable once built. The current section is carried
/// in a fold accumulator, so one instance can serve any number of documents.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    extractors: Vec<MetadataExtractor>,
    section_header: Option<Regex>,
    noise_markers: Vec<String>,
}

#[derive(Default)]
struct ScanState {
    metadata: DocumentMetadata,
    section: Option<String>,
    lines: Vec<LineRecord>,
}

impl LineClassifier {
    /// Create a classifier for the built-in invoice template.
    pub fn new() -> Self {
        Self::from_config(&ClassifierConfig::default())
            .expect("built-in classifier patterns compile")
    }

    /// Create a classifier from configuration, compiling all patterns.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        let section_header =
            section_header(&config.sections).map_err(|source| BillError::Pattern {
                name: "section header",
                source,
            })?;

        Ok(Self {
            extractors: MetadataExtractor::all_from_config(config)?,
            section_header,
            noise_markers: config.noise_markers.clone(),
        })
    }

    /// Classify the lines of one document, in order.
    pub fn classify<I, S>(&self, lines: I) -> ClassifiedDocument
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let state = lines
            .into_iter()
            .fold(ScanState::default(), |state, line| self.step(state, line.as_ref()));

        debug!(
            "Classified {} product line candidates, metadata: {:?}",
            state.lines.len(),
            state.metadata
        );

        ClassifiedDocument {
            metadata: state.metadata,
            lines: state.lines,
        }
    }

    /// Section named by a header line, if `line` is one.
    pub fn section_header<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.section_header
            .as_ref()?
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    pub fn is_noise(&self, line: &str) -> bool {
        self.noise_markers
            .iter()
            .any(|marker| line.contains(marker.as_str()))
    }

    fn step(&self, mut state: ScanState, raw: &str) -> ScanState {
        let line = raw.trim();
        if line.is_empty() {
            return state;
        }

        for extractor in &self.extractors {
            if state.metadata.is_set(extractor.field()) {
                continue;
            }
            if let Some(value) = extractor.extract(line) {
                state.metadata.set_if_absent(extractor.field(), value);
            }
        }

        if let Some(section) = self.section_header(line) {
            state.section = Some(section.to_string());
            return state;
        }

        if self.is_noise(line) {
            return state;
        }

        let record = LineRecord::new(line, state.section.clone());
        state.lines.push(record);
        state
    }
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sections_are_sticky() {
        let classifier = LineClassifier::new();
        let doc = classifier.classify([
            "1 AAAAA BEFORE 1.00 1.00",
            "Frozen ----",
            "2 BBBBB ICE CREAM 1.00 2.00",
            "",
            "   ",
            "3 CCCCC PEAS 1.00 3.00",
            "Grocery ---------",
            "4 DDDDD RICE 1.00 4.00",
        ]);

        assert_eq!(
            doc.lines,
            vec![
                LineRecord::new("1 AAAAA BEFORE 1.00 1.00", None),
                LineRecord::new("2 BBBBB ICE CREAM 1.00 2.00", Some("Frozen".to_string())),
                LineRecord::new("3 CCCCC PEAS 1.00 3.00", Some("Frozen".to_string())),
                LineRecord::new("4 DDDDD RICE 1.00 4.00", Some("Grocery".to_string())),
            ]
        );
    }

    #[test]
    fn test_noise_lines_are_dropped() {
        let classifier = LineClassifier::new();
        let doc = classifier.classify([
            "*** CONTINUED ON NEXT PAGE ***",
            "NO Refunds after 7 days",
            "Write Invoice number on check",
            "kept line",
        ]);

        assert_eq!(doc.lines, vec![LineRecord::new("kept line", None)]);
    }

    #[test]
    fn test_metadata_first_match_wins() {
        let classifier = LineClassifier::new();
        let doc = classifier.classify([
            "  5012345 1 of 2  ",
            "QUOTE 3/14/2024",
            "SOLD Corner Market SHIP Corner Market DC Lake Zurich",
            "6099999 2 of 2",
            "QUOTE 4/1/2024",
        ]);

        assert_eq!(doc.metadata.invoice_number.as_deref(), Some("5012345"));
        assert_eq!(doc.metadata.quote_date.as_deref(), Some("3/14/2024"));
        assert_eq!(doc.metadata.sold_to.as_deref(), Some("Corner Market"));
        assert_eq!(doc.metadata.ship_to.as_deref(), Some("Corner Market DC"));

        // QUOTE lines are noise; the others stay as (unparseable) candidates.
        let texts: Vec<&str> = doc.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "5012345 1 of 2",
                "SOLD Corner Market SHIP Corner Market DC Lake Zurich",
                "6099999 2 of 2",
            ]
        );
    }

    #[test]
    fn test_header_line_still_feeds_metadata() {
        let classifier = LineClassifier::new();
        let doc = classifier.classify(["Frozen ---- 5012345 1 of 2"]);

        assert!(doc.lines.is_empty());
        assert_eq!(doc.metadata.invoice_number.as_deref(), Some("5012345"));
    }

    #[test]
    fn test_custom_configuration() {
        let config = ClassifierConfig {
            sections: vec!["Bakery".to_string()],
            noise_markers: vec!["SUBTOTAL".to_string()],
            ..ClassifierConfig::default()
        };
        let classifier = LineClassifier::from_config(&config).unwrap();
        let doc = classifier.classify(["Frozen ----", "Bakery --", "SUBTOTAL 9.00", "bread"]);

        assert_eq!(
            doc.lines,
            vec![
                LineRecord::new("Frozen ----", None),
                LineRecord::new("bread", Some("Bakery".to_string())),
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        let doc = LineClassifier::new().classify(Vec::<String>::new());
        assert_eq!(doc, ClassifiedDocument::default());
    }
}
