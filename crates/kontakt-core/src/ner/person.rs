//! Full-name recovery from PERSON spans.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

use crate::lexicon::Lexicon;

use super::{is_legal_form, matches_entry, EntityKind, EntitySpan};

lazy_static! {
    // Surname FirstName Patronymic, anchored at a word start
    static ref FIO_FULL: Regex = Regex::new(
        r"^[А-ЯЁ][а-яё]+(?:-[А-ЯЁ][а-яё]+)?[ \t]+[А-ЯЁ][а-яё]+[ \t]+[А-ЯЁ][а-яё]+\b"
    ).unwrap();

    // Surname I. O., anchored at a word start
    static ref FIO_INITIALS: Regex = Regex::new(
        r"^([А-ЯЁ][а-яё]+(?:-[А-ЯЁ][а-яё]+)?)[ \t]+([А-ЯЁ])\.[ \t]*([А-ЯЁ])\."
    ).unwrap();

    static ref CAPITALIZED_WORD: Regex = Regex::new(r"\b[А-ЯЁ][а-яё]+").unwrap();

    static ref NAME_TOKEN: Regex = Regex::new(
        r"^(?:[А-ЯЁA-Z][а-яёa-z]+(?:-[А-ЯЁA-Z][а-яёa-z]+)?|[А-ЯЁA-Z]\.)$"
    ).unwrap();
}

/// Words that never belong to a name.
const CONTACT_WORDS: &[&str] = &[
    "тел", "телефон", "моб", "мобильный", "факс", "email", "e-mail", "почта", "сайт",
];

/// Fragments that mark a candidate as technical noise.
const TECHNICAL_JUNK: &[&str] = &[
    "telegram:", "subject:", "от кого", "компания", "youtube", "rutube", "центр лабораторной",
];

/// Recover full names for the PERSON spans of `text`.
///
/// Tagger output may lose case endings, so each span is re-matched against
/// the original text with the two name shapes. Spans without a shape match
/// contribute their own cleaned text.
pub fn merge_persons(text: &str, spans: &[EntitySpan], lexicon: &Lexicon) -> Vec<String> {
    let shapes = shape_matches(text, lexicon);
    let mut candidates: Vec<String> = Vec::new();

    for span in spans.iter().filter(|s| s.kind == EntityKind::Person) {
        let before = candidates.len();
        for (start, end, name) in &shapes {
            if span.overlaps(*start, *end) {
                candidates.push(name.clone());
            }
        }
        if candidates.len() == before {
            candidates.push(span.text.clone());
        }
    }

    let mut result: Vec<String> = Vec::new();
    for candidate in candidates {
        let Some(name) = clean_fio(&candidate, lexicon) else {
            trace!("Discarding person candidate {:?}", candidate);
            continue;
        };
        if !result.contains(&name) {
            result.push(name);
        }
    }
    result
}

/// Name-shaped phrases in `text`, tried at every capitalized word that is
/// not a title or contact word, so "Менеджер Петрова Анна Сергеевна" yields
/// the name without the title.
fn shape_matches(text: &str, lexicon: &Lexicon) -> Vec<(usize, usize, String)> {
    let mut found = Vec::new();
    let mut next_free = 0;

    for word in CAPITALIZED_WORD.find_iter(text) {
        if word.start() < next_free || is_non_name_word(word.as_str(), lexicon) {
            continue;
        }
        let rest = &text[word.start()..];

        if let Some(caps) = FIO_INITIALS.captures(rest) {
            let len = caps[0].len();
            found.push((
                word.start(),
                word.start() + len,
                format!("{} {}. {}.", &caps[1], &caps[2], &caps[3]),
            ));
            next_free = word.start() + len;
        } else if let Some(m) = FIO_FULL.find(rest) {
            found.push((word.start(), word.start() + m.end(), m.as_str().to_string()));
            next_free = word.start() + m.end();
        }
    }

    found
}

fn is_non_name_word(word: &str, lexicon: &Lexicon) -> bool {
    let bare = word.to_lowercase();
    CONTACT_WORDS.contains(&bare.as_str())
        || is_legal_form(word)
        || matches_entry(word, lexicon.position_keywords())
        || matches_entry(word, lexicon.position_modifiers())
        || (bare.chars().count() > 3 && matches_entry(word, lexicon.position_continuations()))
}

/// Strip contact and job words, normalize initials, then validate.
fn clean_fio(candidate: &str, lexicon: &Lexicon) -> Option<String> {
    let lowered = candidate.to_lowercase();
    if TECHNICAL_JUNK.iter().any(|j| lowered.contains(j)) {
        return None;
    }

    let mut tokens: Vec<String> = Vec::new();
    for raw in candidate.split_whitespace() {
        let token = raw.trim_matches(|c: char| matches!(c, ',' | ';' | ':' | '|' | '"' | '«' | '»'));
        let bare = token.trim_end_matches('.').to_lowercase();
        if token.is_empty()
            || CONTACT_WORDS.contains(&bare.as_str())
            || is_legal_form(token)
            || matches_entry(token, lexicon.position_keywords())
            || matches_entry(token, lexicon.position_modifiers())
        {
            continue;
        }
        // A department word means this is a title, not a name.
        if bare.chars().count() > 3 && matches_entry(token, lexicon.position_continuations()) {
            return None;
        }
        tokens.extend(split_initials(token));
    }

    let name = tokens.join(" ");
    if !is_name_shape(&name) || lexicon.is_person_stop_word(&name) {
        return None;
    }
    Some(name)
}

/// "И.О." -> ["И.", "О."]; other tokens pass through.
fn split_initials(token: &str) -> Vec<String> {
    let parts: Vec<&str> = token.split_inclusive('.').collect();
    if parts.len() > 1 && parts.iter().all(|p| p.chars().count() == 2 && p.ends_with('.')) {
        parts.iter().map(|p| p.to_string()).collect()
    } else {
        vec![token.to_string()]
    }
}

/// 2-4 tokens, each a capitalized word or an initial, with at least one
/// full word.
pub fn is_name_shape(name: &str) -> bool {
    let tokens: Vec<&str> = name.split_whitespace().collect();
    if !(2..=4).contains(&tokens.len()) {
        return false;
    }
    tokens.iter().all(|t| NAME_TOKEN.is_match(t)) && tokens.iter().any(|t| !t.ends_with('.'))
}
