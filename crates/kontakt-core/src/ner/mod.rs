//! Entity extraction for signature blocks.
//!
//! A statistical or rule-based [`EntityTagger`] supplies typed spans; the
//! extractor then re-reads the block to recover full names, job titles,
//! organizations and addresses, and filters everything through the lexicon.

mod address;
mod heuristic;
mod organization;
mod person;
mod position;

pub use address::extract_addresses;
pub use heuristic::HeuristicTagger;
pub use organization::clean_organizations;
pub use person::{is_name_shape, merge_persons};
pub use position::extract_positions;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::lexicon::Lexicon;

/// Entity categories produced by a tagger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityKind {
    Person,
    #[serde(rename = "ORG")]
    Organization,
    #[serde(rename = "LOC")]
    Location,
}

/// A typed span of the tagged text. Offsets are byte offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub kind: EntityKind,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl EntitySpan {
    pub fn new(kind: EntityKind, text: &str, start: usize) -> Self {
        Self {
            kind,
            text: text.to_string(),
            start,
            end: start + text.len(),
        }
    }

    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && start < self.end
    }
}

/// Named-entity tagging backend.
///
/// Any implementation returning PERSON/ORG/LOC spans for a text can back
/// the extractor, whether rule-based or model-based.
pub trait EntityTagger: Send + Sync {
    /// Tag all entities in `text`.
    fn tag(&self, text: &str) -> Vec<EntitySpan>;
}

/// Entities found in one block, each list filtered and de-duplicated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entities {
    pub persons: Vec<String>,
    pub organizations: Vec<String>,
    pub positions: Vec<String>,
    pub locations: Vec<String>,
}

/// Hybrid tagger + rules entity extractor.
pub struct EntityExtractor {
    lexicon: Arc<Lexicon>,
    tagger: Box<dyn EntityTagger>,
}

impl EntityExtractor {
    /// Create an extractor backed by the built-in [`HeuristicTagger`].
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self {
            lexicon,
            tagger: Box::new(HeuristicTagger::new()),
        }
    }

    /// Replace the tagging backend.
    pub fn with_tagger(mut self, tagger: impl EntityTagger + 'static) -> Self {
        self.tagger = Box::new(tagger);
        self
    }

    pub fn extract(&self, text: &str) -> Entities {
        if text.trim().is_empty() {
            debug!("Empty block, no entities");
            return Entities::default();
        }

        let spans = self.tagger.tag(text);
        debug!("Tagger returned {} spans", spans.len());

        let entities = Entities {
            persons: merge_persons(text, &spans, &self.lexicon),
            organizations: clean_organizations(text, &spans, &self.lexicon),
            positions: extract_positions(text, &self.lexicon),
            locations: extract_addresses(text, &self.lexicon),
        };

        debug!(
            "Entities: {} persons, {} organizations, {} positions, {} locations",
            entities.persons.len(),
            entities.organizations.len(),
            entities.positions.len(),
            entities.locations.len()
        );

        entities
    }
}

/// Legal-form tokens that mark organization names.
pub(crate) const LEGAL_FORMS: &[&str] = &[
    "ооо", "оао", "зао", "пао", "ао", "нао", "ип", "фгбун", "фгбу", "фгбоу", "фгуп", "фбуз",
    "гбуз", "гбу", "гуп", "муп", "нии", "нпо", "нпп", "llc", "ltd", "gmbh", "inc",
];

/// Whether a token (any case, surrounding punctuation ignored) is a legal form.
pub(crate) fn is_legal_form(token: &str) -> bool {
    let token = normalize_token(token);
    LEGAL_FORMS.contains(&token.as_str())
}

/// Lower-cased token without surrounding punctuation and quotes.
pub(crate) fn normalize_token(token: &str) -> String {
    token
        .trim_matches(|c: char| !c.is_alphanumeric() && c != '.')
        .trim_end_matches('.')
        .to_lowercase()
}

/// Dictionary lookup with inflection tolerance.
///
/// Short entries (up to 3 characters) must match exactly. Longer entries
/// match as a prefix, and entries of 7+ characters also match by their stem
/// without the last two letters, so "генеральный" covers "генерального".
pub(crate) fn matches_entry(token: &str, entries: &[String]) -> bool {
    let token = token
        .trim_matches(|c: char| matches!(c, ',' | ';' | ':' | '|' | '(' | ')' | '"' | '«' | '»'))
        .to_lowercase();
    if token.is_empty() {
        return false;
    }

    entries.iter().any(|entry| {
        let len = entry.chars().count();
        if token == *entry || token.trim_end_matches('.') == entry.trim_end_matches('.') {
            return true;
        }
        if len <= 3 {
            return false;
        }
        if token.starts_with(entry.as_str()) {
            return true;
        }
        if len >= 7 {
            let stem: String = entry.chars().take(len - 2).collect();
            return token.starts_with(&stem);
        }
        false
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct FixedTagger(Vec<EntitySpan>);

    impl EntityTagger for FixedTagger {
        fn tag(&self, _text: &str) -> Vec<EntitySpan> {
            self.0.clone()
        }
    }

    #[test]
    fn test_matches_entry_inflections() {
        let entries: Vec<String> = ["по", "продаж", "генеральный", "директор"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(matches_entry("по", &entries));
        assert!(!matches_entry("пол", &entries));
        assert!(matches_entry("продажам,", &entries));
        assert!(matches_entry("Генерального", &entries));
        assert!(matches_entry("директора", &entries));
        assert!(!matches_entry("Иванов", &entries));
    }

    #[test]
    fn test_legal_form_detection() {
        assert!(is_legal_form("ООО"));
        assert!(is_legal_form("«ЗАО"));
        assert!(is_legal_form("Ltd."));
        assert!(!is_legal_form("Вектор"));
    }

    #[test]
    fn test_extract_signature_entities() {
        let extractor = EntityExtractor::new(Arc::new(Lexicon::embedded()));
        let entities = extractor.extract(
            "Директор по продажам\nИванов Иван Иванович\nООО «Вектор»\nг. Новосибирск, ул. Ленина, д. 5",
        );

        assert_eq!(entities.persons, vec!["Иванов Иван Иванович".to_string()]);
        assert_eq!(entities.positions, vec!["Директор по продажам".to_string()]);
        assert_eq!(entities.organizations, vec!["ООО «Вектор»".to_string()]);
        assert_eq!(
            entities.locations,
            vec!["г. Новосибирск, ул. Ленина, д. 5".to_string()]
        );
    }

    #[test]
    fn test_custom_tagger_is_used() {
        let text = "Петров Пётр\nАО Ромашка";
        let spans = vec![EntitySpan::new(EntityKind::Organization, "АО Ромашка", 22)];
        let extractor =
            EntityExtractor::new(Arc::new(Lexicon::embedded())).with_tagger(FixedTagger(spans));

        let entities = extractor.extract(text);
        // No PERSON spans from the tagger, so no names.
        assert!(entities.persons.is_empty());
        assert_eq!(entities.organizations, vec!["АО Ромашка".to_string()]);
    }

    #[test]
    fn test_empty_block() {
        let extractor = EntityExtractor::new(Arc::new(Lexicon::embedded()));
        assert_eq!(extractor.extract("  \n "), Entities::default());
    }
}
