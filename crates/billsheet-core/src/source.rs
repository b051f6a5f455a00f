//! Text line sources feeding the line classifier.

use crate::error::Result;

/// Ordered text lines of one document, page boundaries flattened.
pub trait LineSource {
    fn lines(&self) -> Result<Vec<String>>;
}

/// Split text into trimmed, non-blank lines.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Plain text already extracted from a document.
#[derive(Debug, Clone, Default)]
pub struct TextLines {
    text: String,
}

impl TextLines {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Read a UTF-8 text file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        Ok(Self::new(std::fs::read_to_string(path)?))
    }
}

impl LineSource for TextLines {
    fn lines(&self) -> Result<Vec<String>> {
        Ok(split_lines(&self.text))
    }
}
