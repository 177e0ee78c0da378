//! Keyword-anchored job title extraction.

use tracing::trace;

use crate::lexicon::Lexicon;

use super::{is_legal_form, matches_entry};

/// Titles this long are sentences, not titles.
const MAX_POSITION_CHARS: usize = 150;

/// Extract job titles, one per line at most.
///
/// A title keyword seeds the title; it grows left over seniority modifiers
/// and must then start the line, and grows right over continuation words
/// until the first word outside the dictionaries or a word ending in `,`
/// `;` or `|`.
pub fn extract_positions(text: &str, lexicon: &Lexicon) -> Vec<String> {
    let mut positions: Vec<String> = Vec::new();

    for line in text.lines() {
        let Some(position) = position_in_line(line, lexicon) else {
            continue;
        };
        if !positions.contains(&position) {
            positions.push(position);
        }
    }

    positions
}

fn position_in_line(line: &str, lexicon: &Lexicon) -> Option<String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let seed = words
        .iter()
        .position(|w| matches_entry(w, lexicon.position_keywords()))?;

    let mut start = seed;
    while start > 0 && matches_entry(words[start - 1], lexicon.position_modifiers()) {
        start -= 1;
    }
    if start != 0 {
        trace!("Title keyword not at line start: {:?}", line);
        return None;
    }

    let mut end = seed + 1;
    if !ends_clause(words[seed]) {
        while end < words.len() {
            let word = words[end];
            let continues = matches_entry(word, lexicon.position_continuations())
                || matches_entry(word, lexicon.position_keywords())
                || matches_entry(word, lexicon.position_modifiers());
            if !continues {
                break;
            }
            end += 1;
            if ends_clause(word) {
                break;
            }
        }
    }

    let title = words[start..end].join(" ");
    let title = title.trim_matches(|c: char| matches!(c, ',' | ';' | ':' | '|' | '-') || c.is_whitespace());

    if title.chars().count() >= MAX_POSITION_CHARS
        || title.split_whitespace().any(is_legal_form)
        || title.is_empty()
    {
        return None;
    }

    Some(capitalize_first(title))
}

fn ends_clause(word: &str) -> bool {
    word.ends_with(',') || word.ends_with(';') || word.ends_with('|')
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn positions(text: &str) -> Vec<String> {
        extract_positions(text, &Lexicon::embedded())
    }

    #[test]
    fn test_extends_right_over_continuations() {
        assert_eq!(
            positions("Директор по продажам\nИванов Иван Иванович"),
            vec!["Директор по продажам".to_string()]
        );
    }

    #[test]
    fn test_extends_left_over_modifiers() {
        assert_eq!(
            positions("ведущий специалист отдела закупок Петров"),
            vec!["Ведущий специалист отдела закупок".to_string()]
        );
        assert_eq!(
            positions("Заместитель генерального директора по развитию"),
            vec!["Заместитель генерального директора по развитию".to_string()]
        );
    }

    #[test]
    fn test_stops_at_separators() {
        assert_eq!(positions("Менеджер | ООО Вектор"), vec!["Менеджер".to_string()]);
        assert_eq!(
            positions("Менеджер по продажам, Иванов"),
            vec!["Менеджер по продажам".to_string()]
        );
    }

    #[test]
    fn test_keyword_must_start_line() {
        assert!(positions("С уважением, менеджер Иванов").is_empty());
    }

    #[test]
    fn test_rejects_org_forms_and_long_lines() {
        let lexicon = Lexicon::from_overrides(&[("position_continuations.txt", "по\nооо\n")]);
        assert!(extract_positions("Директор ООО", &lexicon).is_empty());
        let long = format!("Менеджер {}", "по ".repeat(60));
        assert!(positions(&long).is_empty());
    }
}
