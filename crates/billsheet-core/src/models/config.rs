//! Configuration structures for the billsheet pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the billsheet pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillConfig {
    /// Line classification configuration.
    pub classifier: ClassifierConfig,

    /// Report export configuration.
    pub export: ExportConfig,
}

/// Section headers, noise markers and metadata patterns of the invoice template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Section names recognised in `<name> ----` header lines.
    pub sections: Vec<String>,

    /// Lines containing any of these phrases are discarded.
    pub noise_markers: Vec<String>,

    /// Invoice number pattern; the first capture group is the value.
    pub invoice_number_pattern: String,

    /// Quote date pattern.
    pub quote_date_pattern: String,

    /// Sold-to party pattern.
    pub sold_to_pattern: String,

    /// Ship-to party pattern.
    pub ship_to_pattern: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            sections: ["Frozen", "Grocery", "Refrigerated", "Mix Misc"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            noise_markers: ["QUOTE", "CONTINUED ON NEXT PAGE", "NO Refunds", "Write Invoice"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            invoice_number_pattern: r"(\d{5,})\s+\d+\s+of\s+\d+".to_string(),
            quote_date_pattern: r"QUOTE\s+(\d{1,2}/\d{1,2}/\d{4})".to_string(),
            sold_to_pattern: r"SOLD\s+(.*?)\s+SHIP".to_string(),
            ship_to_pattern: r"SHIP\s+(.*?)\s+(?:Lake Zurich|IL)".to_string(),
        }
    }
}

/// Report export configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory under which report directories are created.
    pub output_dir: PathBuf,

    /// Prefix of the timestamped report directory name.
    pub file_prefix: String,

    /// Keep the Ship To column in the items sheet.
    pub include_ship_to: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("outputs"),
            file_prefix: "invoice_export".to_string(),
            include_ship_to: true,
        }
    }
}

impl BillConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
