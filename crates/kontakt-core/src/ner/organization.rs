//! Organization span cleaning.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

use crate::lexicon::Lexicon;

use super::{matches_entry, EntityKind, EntitySpan};

lazy_static! {
    // "в Новосибирской области", "в Алтайском крае", "в Республике Алтай"
    static ref REGION_QUALIFIER: Regex = Regex::new(
        r"^[^\n]*?\bв[ \t]+(?:[А-ЯЁ][а-яё\-]+(?:ой|ом)(?:[ \t]+[а-яё]+)?[ \t]+(?:крае|области|обл\.)|Республике[ \t]+[А-ЯЁ][а-яё\-]+(?:[ \t]+[А-ЯЁ][а-яё\-]+)?|[А-ЯЁ][а-яё\-]+ой[ \t]+[Рр]еспублике)"
    ).unwrap();

    static ref TRAILING_CITY: Regex = Regex::new(
        r"[ \t]*,?[ \t]*(?:\b[гГ]\.|(?i:\bгород))[ \t]*[А-ЯЁ][а-яё\-]+[ \t]*$"
    ).unwrap();

    static ref CONTACT_TAIL: Regex = Regex::new(
        r"(?i)[ \t,;]*(?:\bтел\b\.?|\bтелефон\b|\bфакс\b|\be-?mail\b|\bмоб\b\.?).*$"
    ).unwrap();

    static ref PHONE_TAIL: Regex = Regex::new(r"[ \t,;]*[+\d(][\d \t()\-+]{5,}$").unwrap();
}

/// Clean the ORG spans of `text` and drop those that are not organizations.
pub fn clean_organizations(text: &str, spans: &[EntitySpan], lexicon: &Lexicon) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();

    for span in spans.iter().filter(|s| s.kind == EntityKind::Organization) {
        let Some(org) = clean_organization(text, span, lexicon) else {
            trace!("Discarding organization candidate {:?}", span.text);
            continue;
        };
        if !result.contains(&org) {
            result.push(org);
        }
    }

    result
}

fn clean_organization(text: &str, span: &EntitySpan, lexicon: &Lexicon) -> Option<String> {
    // Region qualifiers are taken from the source line, since the span may
    // have been cut short of them. The qualifier must follow the span within
    // the same clause.
    let line_rest = text.get(span.start..).and_then(|rest| rest.lines().next()).unwrap_or("");
    let region = REGION_QUALIFIER.find(line_rest).filter(|m| {
        line_rest.starts_with(span.text.as_str())
            && line_rest
                .get(span.text.len().min(m.end())..m.end())
                .is_some_and(|between| !between.contains([',', ';', '|']))
    });

    let mut org = match region {
        Some(m) => strip_leading_title(m.as_str(), lexicon),
        None => TRAILING_CITY
            .replace(&strip_leading_title(&span.text, lexicon), "")
            .into_owned(),
    };

    org = CONTACT_TAIL.replace(&org, "").into_owned();
    org = PHONE_TAIL.replace(&org, "").into_owned();
    let org = org
        .trim_matches(|c: char| matches!(c, ',' | ';' | ':' | '|' | '-') || c.is_whitespace())
        .to_string();

    if org.chars().count() < 3 {
        return None;
    }
    if lexicon.matches_position_pattern(&org) || lexicon.is_org_stop_word(&org) {
        return None;
    }

    Some(org)
}

/// "Менеджер ООО Вектор" -> "ООО Вектор".
fn strip_leading_title(org: &str, lexicon: &Lexicon) -> String {
    let words: Vec<&str> = org.split_whitespace().collect();
    let skip = words
        .iter()
        .take_while(|w| {
            matches_entry(w, lexicon.position_keywords()) || matches_entry(w, lexicon.position_modifiers())
        })
        .count();
    words[skip..].join(" ")
}
