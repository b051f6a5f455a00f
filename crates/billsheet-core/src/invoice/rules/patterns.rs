//! Regex patterns for the product line grammar.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Quantity, product code (shortest run of >= 5 of [A-Z0-9 ]), description,
    // unit price, total price. Anchored at both ends.
    pub static ref PRODUCT_LINE: Regex = Regex::new(
        r"^(\d+)\s+([A-Z0-9 ]{5,}?)\s+(.*?)\s+(\d+\.\d{2})\s+(\d+\.\d{2})$"
    ).unwrap();

    // Packet quantity suffix, e.g. "CHICKEN WINGS (12)"
    pub static ref PACKET_SUFFIX: Regex = Regex::new(
        r"\((\d{1,4})\)$"
    ).unwrap();
}

/// Build the section header pattern: a section name followed by a dash rule.
pub fn section_header(sections: &[String]) -> Result<Option<Regex>, regex::Error> {
    if sections.is_empty() {
        return Ok(None);
    }

    let names: Vec<String> = sections.iter().map(|s| regex::escape(s)).collect();
    Regex::new(&format!(r"({})\s*-+", names.join("|"))).map(Some)
}
