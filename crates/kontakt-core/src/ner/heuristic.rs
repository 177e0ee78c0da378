//! Rule-based tagger for Russian business correspondence.

use lazy_static::lazy_static;
use regex::Regex;

use super::{EntityKind, EntitySpan, EntityTagger};

lazy_static! {
    // Legal form followed by a quoted name and the rest of the clause
    static ref ORG_SPAN: Regex = Regex::new(
        r#"\b(?:ООО|ОАО|ЗАО|ПАО|АО|НАО|ИП|ФГБУН|ФГБУ|ФГБОУ|ФГУП|ФБУЗ|ГБУЗ|ГБУ|ГУП|МУП|НИИ|НПО|НПП|LLC|Ltd|GmbH|Inc)\b\.?[ \t]*(?:«[^»\n]*»|"[^"\n]*"|“[^”\n]*”)?[^,;|\n]*"#
    ).unwrap();

    // City after г. / город
    static ref LOC_SPAN: Regex = Regex::new(
        r"(?:\b[гГ]\.[ \t]*|(?i:\bгород)[ \t]+)([А-ЯЁ][а-яё]+(?:-[А-ЯЁа-яё][а-яё]+)*)"
    ).unwrap();

    // Two to four capitalized words, or a surname with initials, on one line
    static ref PERSON_RUN: Regex = Regex::new(
        r"\b[А-ЯЁ][а-яё]+[ \t]+[А-ЯЁ]\.[ \t]*[А-ЯЁ]\.|\b[А-ЯЁ][а-яё]+(?:-[А-ЯЁ][а-яё]+)?(?:[ \t]+[А-ЯЁ][а-яё]+(?:-[А-ЯЁ][а-яё]+)?){1,3}\b"
    ).unwrap();
}

/// Tags ORG spans by legal form, LOC spans by city prefix and PERSON spans
/// by capitalization.
#[derive(Debug, Clone, Default)]
pub struct HeuristicTagger;

impl HeuristicTagger {
    pub fn new() -> Self {
        Self
    }
}

impl EntityTagger for HeuristicTagger {
    fn tag(&self, text: &str) -> Vec<EntitySpan> {
        let mut spans = Vec::new();

        for m in ORG_SPAN.find_iter(text) {
            let trimmed = m.as_str().trim_end();
            spans.push(EntitySpan::new(EntityKind::Organization, trimmed, m.start()));
        }

        for caps in LOC_SPAN.captures_iter(text) {
            if let Some(city) = caps.get(1) {
                spans.push(EntitySpan::new(EntityKind::Location, city.as_str(), city.start()));
            }
        }

        let taken: Vec<(usize, usize)> = spans.iter().map(|s| (s.start, s.end)).collect();
        for m in PERSON_RUN.find_iter(text) {
            if taken.iter().any(|&(s, e)| s < m.end() && m.start() < e) {
                continue;
            }
            spans.push(EntitySpan::new(EntityKind::Person, m.as_str(), m.start()));
        }

        spans.sort_by_key(|s| s.start);
        spans
    }
}
