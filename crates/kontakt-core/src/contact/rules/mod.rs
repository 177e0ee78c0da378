//! Rule-based field extractors for contact blocks.

pub mod email;
pub mod inn;
pub mod patterns;
pub mod phone;

pub use email::{extract_emails, is_valid_email, EmailExtractor};
pub use inn::{extract_inn, validate_inn, InnExtractor};
pub use patterns::*;
pub use phone::{NumberClass, PhoneExtractor, PhoneNumber, TemplateClass};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// Extraction context with confidence scores.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Byte span in the source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }

    /// Whether this match's span intersects `[start, end)`.
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.position.is_some_and(|(s, e)| s < end && start < e)
    }
}
