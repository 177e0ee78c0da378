//! Common regex patterns for contact field extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Email addresses
    pub static ref EMAIL: Regex = Regex::new(
        r"[\w.+\-]+@[\w.\-]+\.[A-Za-z]{2,}"
    ).unwrap();

    // INN (Russian taxpayer ID), 12 digits tried before 10
    pub static ref INN_LABELED: Regex = Regex::new(
        r"(?i)ИНН(?:\s*/\s*КПП)?[\s:№]*([0-9]{12}|[0-9]{10})\b"
    ).unwrap();

    pub static ref INN_LOOSE: Regex = Regex::new(
        r"(?i)\bИНН\b[^0-9\n]{0,40}([0-9]{12}|[0-9]{10})\b"
    ).unwrap();

    // Phone extension keywords
    pub static ref EXTENSION: Regex = Regex::new(
        r"(?i)\b(?:добавочный|доб|доп|ext|вн|в\.\s*н)\.?\s*([0-9]{1,5})"
    ).unwrap();

    // "(48)" right after a number: a sibling differing in the last two digits
    pub static ref VARIANT_SUFFIX: Regex = Regex::new(
        r"^\s*\(([0-9]{1,2})\)"
    ).unwrap();

    // ", 6-43-65" right after a number: a sibling sharing the area code
    pub static ref COMMA_SHORT_FORM: Regex = Regex::new(
        r"^\s*,\s*([0-9]{1,3})[-\s]?([0-9]{2})[-\s]?([0-9]{2})\b"
    ).unwrap();

    // ", г. Иркутск" after a short form: the short form was a postal code
    pub static ref CITY_AFTER: Regex = Regex::new(
        r"^\s*,?\s*(?:[гГ]\.|[гГ]ород\s)"
    ).unwrap();

    // Spreadsheet exports turn long numbers into 7.9131234567E+10
    pub static ref SCIENTIFIC_NUMBER: Regex = Regex::new(
        r"(?i)\b([0-9]+)\.([0-9]+)e\+?([0-9]{1,2})\b"
    ).unwrap();

    // City inside an address
    pub static ref CITY_ABBREVIATED: Regex = Regex::new(
        r"\b[гГ]\.?\s*([А-ЯЁ][а-яё\-]+)"
    ).unwrap();

    pub static ref CITY_SPELLED: Regex = Regex::new(
        r"(?i:\bгород)\s+([А-ЯЁ][а-яё\-]+)"
    ).unwrap();

    // Company label prefixes and cut-off suffixes
    pub static ref COMPANY_LABEL: Regex = Regex::new(
        r"(?i)^\s*(?:конечный\s+пользователь|заказчик|клиент|customer|client)\s*:\s*"
    ).unwrap();

    pub static ref COMPANY_CUTS: Vec<Regex> = vec![
        Regex::new(r"(?i),\s*инн\s+\d+.*$").unwrap(),
        Regex::new(r"(?i),\s*кпп\s+\d+.*$").unwrap(),
        Regex::new(r",\s*\d{6},.*$").unwrap(),
        Regex::new(r"\s*\d{6},.*$").unwrap(),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_pattern() {
        let m = EMAIL.find("пишите на ivan.petrov+kp@sub.example.ru, спасибо").unwrap();
        assert_eq!(m.as_str(), "ivan.petrov+kp@sub.example.ru");
    }

    #[test]
    fn test_extension_pattern_variants() {
        for text in ["доб. 121", "доп.121", "Добавочный 7", "ext. 55", "вн. 12", "в.н. 3"] {
            assert!(EXTENSION.is_match(text), "{}", text);
        }
        assert!(!EXTENSION.is_match("внутренний"));
    }

    #[test]
    fn test_inn_prefers_twelve_digits() {
        let caps = INN_LABELED.captures("ИНН 540712345678").unwrap();
        assert_eq!(&caps[1], "540712345678");
        let caps = INN_LABELED.captures("ИНН/КПП 5407123456/540701001").unwrap();
        assert_eq!(&caps[1], "5407123456");
    }
}
