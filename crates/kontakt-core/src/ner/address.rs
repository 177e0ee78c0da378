//! Address and city-line extraction.

use lazy_static::lazy_static;
use regex::Regex;

use crate::lexicon::Lexicon;

use super::matches_entry;

lazy_static! {
    static ref ADDRESS_MARKER: Regex = Regex::new(
        r"(?:^|[^\p{L}])(?:[гГ]\.\s*[А-ЯЁ][а-яё]|(?:ул|д|пр|пр-т|корп?|оф|кв|стр|пер|пос)\.|(?i:дом|улица|проспект|корпус|офис|квартира|шоссе|переулок|бульвар|набережная)\b)"
    ).unwrap();

    static ref STANDALONE_CITY: Regex = Regex::new(r"^[А-ЯЁ][а-яё]{3,}(?:-[А-ЯЁа-яё][а-яё]+)*$").unwrap();
}

/// Department vocabulary that marks a capitalized line as part of a title.
const DEPARTMENT_WORDS: &[&str] = &["отдел", "департамент", "лаборатор", "управлени", "служб", "групп"];

/// Minimum length of a marker line to count as an address.
const MIN_ADDRESS_CHARS: usize = 9;

/// Extract address lines, longest first.
///
/// Lines with street/building markers are kept verbatim. Without such lines,
/// standalone capitalized words are taken as city candidates unless a
/// neighboring line looks like a title or department.
pub fn extract_addresses(text: &str, lexicon: &Lexicon) -> Vec<String> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();

    let mut addresses: Vec<String> = lines
        .iter()
        .filter(|line| ADDRESS_MARKER.is_match(line))
        .map(|line| trim_edges(line).to_string())
        .filter(|line| line.chars().count() >= MIN_ADDRESS_CHARS)
        .collect();

    if addresses.is_empty() {
        addresses = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| STANDALONE_CITY.is_match(trim_edges(line)))
            .filter(|(i, _)| {
                let neighbors = [i.checked_sub(1), Some(i + 1)];
                !neighbors
                    .iter()
                    .flatten()
                    .filter_map(|j| lines.get(*j))
                    .any(|l| is_title_line(l, lexicon))
            })
            .map(|(_, line)| trim_edges(line).to_string())
            .collect();
    }

    addresses.retain(|a| !lexicon.is_blacklisted_address(a) && !lexicon.is_person_stop_word(a));
    addresses.sort_by_key(|a| std::cmp::Reverse(a.chars().count()));

    let mut unique: Vec<String> = Vec::new();
    for address in addresses {
        if !unique.contains(&address) {
            unique.push(address);
        }
    }
    unique
}

fn is_title_line(line: &str, lexicon: &Lexicon) -> bool {
    let lower = line.to_lowercase();
    DEPARTMENT_WORDS.iter().any(|w| lower.contains(w))
        || line
            .split_whitespace()
            .any(|w| matches_entry(w, lexicon.position_keywords()))
}

fn trim_edges(line: &str) -> &str {
    line.trim_matches(|c: char| matches!(c, ',' | ';' | ':' | '|' | '-' | '>') || c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn addresses(text: &str) -> Vec<String> {
        extract_addresses(text, &Lexicon::embedded())
    }

    #[test]
    fn test_marker_lines_longest_first() {
        let text = "г. Новосибирск\n630099, г. Новосибирск, ул. Ленина, д. 5, оф. 12,\nТел.: 8 (383) 212-34-56";
        assert_eq!(
            addresses(text),
            vec![
                "630099, г. Новосибирск, ул. Ленина, д. 5, оф. 12".to_string(),
                "г. Новосибирск".to_string(),
            ]
        );
    }

    #[test]
    fn test_short_marker_lines_dropped() {
        assert!(addresses("д. 5").is_empty());
        // "доб." is not a building marker
        assert!(addresses("Тел. 8 (383) 123-45-67 доб. 12").is_empty());
    }

    #[test]
    fn test_initials_are_not_markers() {
        assert!(addresses("Сидоров И. Д.").is_empty());
        assert!(addresses("Петров Г. Д.").is_empty());
        assert_eq!(
            addresses("Петров Г. Д.\nг. Иркутск"),
            vec!["г. Иркутск".to_string()]
        );
    }

    #[test]
    fn test_standalone_city_candidates() {
        assert_eq!(addresses("Иванов Иван\nНовосибирск"), vec!["Новосибирск".to_string()]);
    }

    #[test]
    fn test_city_next_to_department_is_skipped() {
        assert!(addresses("Отдел снабжения\nЛаборатория\nМосква").is_empty());
    }

    #[test]
    fn test_blacklisted_lines_removed() {
        assert!(addresses("Спасибо").is_empty());
        assert!(addresses("от кого: г. Москва, ул. Тверская").is_empty());
    }
}
