//! Email address extraction and shape validation.

use super::patterns::EMAIL;
use super::{ExtractionMatch, FieldExtractor};

/// Email field extractor.
pub struct EmailExtractor;

impl EmailExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EmailExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for EmailExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();

        for m in EMAIL.find_iter(text) {
            let email = m.as_str().trim_end_matches('.').to_lowercase();
            if !is_valid_email(&email) || results.iter().any(|r| r.value == email) {
                continue;
            }
            results.push(
                ExtractionMatch::new(email, 0.95, m.as_str()).with_position(m.start(), m.end()),
            );
        }

        results
    }
}

/// Extract all distinct, lower-cased email addresses in text order.
pub fn extract_emails(text: &str) -> Vec<String> {
    EmailExtractor::new()
        .extract_all(text)
        .into_iter()
        .map(|m| m.value)
        .collect()
}

/// Check the local@domain.tld shape.
///
/// The local part is 1-64 characters; the domain is at most 255 characters,
/// contains a dot, and neither starts nor ends with one.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    let local_len = local.chars().count();
    if local_len == 0 || local_len > 64 {
        return false;
    }

    if domain.is_empty()
        || domain.len() > 255
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return false;
    }

    EMAIL.find(email).is_some_and(|m| m.start() == 0 && m.end() == email.len())
}
