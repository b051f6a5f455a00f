//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod process;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use billsheet_core::models::config::BillConfig;
use billsheet_core::{BillProcessor, LineSource, PdfExtractor, ProcessedDocument, TextLines};

/// Supported input file extensions.
pub const INPUT_EXTENSIONS: [&str; 2] = ["pdf", "txt"];

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("billsheet")
        .join("config.json")
}

/// Load the configuration from `config_path`, the default location, or built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<BillConfig> {
    if let Some(path) = config_path {
        return Ok(BillConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using configuration from {}", default_path.display());
        Ok(BillConfig::from_file(&default_path)?)
    } else {
        Ok(BillConfig::default())
    }
}

pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Extract the lines of one input file and run them through the processor.
pub fn process_file(path: &Path, processor: &BillProcessor) -> anyhow::Result<ProcessedDocument> {
    let extension = extension_of(path);

    let source: Box<dyn LineSource> = match extension.as_str() {
        "pdf" => {
            let data = fs::read(path)?;
            Box::new(PdfExtractor::from_bytes(&data)?)
        }
        "txt" => Box::new(TextLines::from_file(path)?),
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    };

    Ok(processor.process_source(source.as_ref())?)
}
