//! INN (Russian taxpayer identification number) extraction and validation.

use super::patterns::{INN_LABELED, INN_LOOSE};
use super::{ExtractionMatch, FieldExtractor};

/// INN field extractor.
pub struct InnExtractor {
    validate: bool,
}

impl InnExtractor {
    /// Create a new INN extractor. Checksums are not validated by default.
    pub fn new() -> Self {
        Self { validate: false }
    }

    /// Set whether to validate INN checksums.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }
}

impl Default for InnExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for InnExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();

        for (pattern, confidence) in [(&*INN_LABELED, 0.95), (&*INN_LOOSE, 0.8)] {
            for caps in pattern.captures_iter(text) {
                let (Some(full), Some(digits)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                let inn = digits.as_str().to_string();

                if results.iter().any(|r| r.value == inn) {
                    continue;
                }

                if !self.validate || validate_inn(&inn) {
                    results.push(
                        ExtractionMatch::new(inn, confidence, full.as_str())
                            .with_position(full.start(), full.end()),
                    );
                }
            }
        }

        results
    }
}

/// Extract the first INN from text.
pub fn extract_inn(text: &str) -> Option<String> {
    InnExtractor::new().extract(text).map(|m| m.value)
}

/// Validate an INN checksum.
///
/// 10-digit (organization) INNs carry one control digit, 12-digit
/// (individual) INNs carry two.
pub fn validate_inn(inn: &str) -> bool {
    let digits: Vec<u32> = inn.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != inn.chars().count() {
        return false;
    }

    let control = |weights: &[u32]| -> u32 {
        let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
        sum % 11 % 10
    };

    match digits.len() {
        10 => control(&[2, 4, 10, 3, 5, 9, 4, 6, 8]) == digits[9],
        12 => {
            control(&[7, 2, 4, 10, 3, 5, 9, 4, 6, 8]) == digits[10]
                && control(&[3, 7, 2, 4, 10, 3, 5, 9, 4, 6, 8]) == digits[11]
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_inn() {
        assert!(validate_inn("7707083893")); // Sberbank
        assert!(validate_inn("500100732259"));
        assert!(!validate_inn("7707083894"));
        assert!(!validate_inn("12345"));
        assert!(!validate_inn("77070838a3"));
    }

    #[test]
    fn test_extract_inn_labeled() {
        assert_eq!(
            extract_inn("ООО «Вектор»\nИНН: 7707083893\nКПП 773601001"),
            Some("7707083893".to_string())
        );
        assert_eq!(
            extract_inn("ИНН/КПП 7707083893/773601001"),
            Some("7707083893".to_string())
        );
    }

    #[test]
    fn test_extract_inn_loose_and_validation() {
        let text = "ИНН организации 7707083894";
        assert_eq!(extract_inn(text), Some("7707083894".to_string()));
        assert!(InnExtractor::new().with_validation(true).extract(text).is_none());
    }

    #[test]
    fn test_unlabelled_digits_are_ignored() {
        assert_eq!(extract_inn("Заказ 7707083893 от 12.03.2025"), None);
    }
}
