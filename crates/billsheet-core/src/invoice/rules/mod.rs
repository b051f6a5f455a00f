//! Rule-based extractors for the invoice template.

pub mod metadata;
pub mod patterns;

pub use metadata::MetadataExtractor;
pub use patterns::{section_header, PACKET_SUFFIX, PRODUCT_LINE};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;
}
