//! Exclusion sets, dictionaries and regex templates.
//!
//! A [`Lexicon`] is loaded once before any message is processed and is never
//! mutated afterwards; share it between components with `Arc<Lexicon>`.

use std::collections::HashSet;
use std::path::Path;

use regex::Regex;
use tracing::{debug, warn};

use crate::contact::rules::phone::TemplateClass;
use crate::error::{LexiconError, Result};
use crate::models::embedded::{self, RESOURCES};

/// A phone template: a regex with named digit groups plus its class.
#[derive(Debug, Clone)]
pub struct PhoneTemplate {
    pub class: TemplateClass,
    pub regex: Regex,
}

/// The immutable resource set consulted by every extraction stage.
#[derive(Debug, Clone)]
pub struct Lexicon {
    internal_domains: HashSet<String>,
    blacklist: HashSet<String>,
    internal_markers: Vec<String>,
    company_blacklist: Vec<String>,
    address_blacklist: Vec<String>,
    stop_words_person: Vec<String>,
    stop_words_org: Vec<String>,
    signature_markers: Vec<String>,
    phone_templates: Vec<PhoneTemplate>,
    position_patterns: Vec<Regex>,
    position_keywords: Vec<String>,
    position_modifiers: Vec<String>,
    position_continuations: Vec<String>,
    mobile_codes: HashSet<String>,
    warnings: Vec<String>,
}

impl Lexicon {
    /// Build a lexicon from the embedded defaults only.
    pub fn embedded() -> Self {
        Self::from_overrides(&[])
    }

    /// Build a lexicon where the named files take the given contents and
    /// all other files use the embedded defaults.
    pub fn from_overrides(overrides: &[(&str, &str)]) -> Self {
        Self::build(|file| {
            overrides
                .iter()
                .find(|(name, _)| *name == file)
                .map(|(_, contents)| (*contents).to_string())
        })
    }

    /// Load resources from a directory. Files absent from the directory fall
    /// back to the embedded defaults.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut loaded = Vec::new();
        for resource in RESOURCES {
            let path = dir.join(resource.file);
            if !path.exists() {
                warn!(
                    "Resource {} not found in {}, using embedded default",
                    resource.file,
                    dir.display()
                );
                continue;
            }
            let contents = std::fs::read_to_string(&path).map_err(|source| LexiconError::Read {
                file: path.display().to_string(),
                source,
            })?;
            loaded.push((resource.file, contents));
        }

        debug!("Loaded {} resource files from {}", loaded.len(), dir.display());

        Ok(Self::build(|file| {
            loaded
                .iter()
                .find(|(name, _)| *name == file)
                .map(|(_, contents)| contents.clone())
        }))
    }

    /// Load from `dir` when given, else from the embedded defaults.
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        match dir {
            Some(dir) => Self::from_dir(dir),
            None => Ok(Self::embedded()),
        }
    }

    fn build(source: impl Fn(&str) -> Option<String>) -> Self {
        let mut warnings = Vec::new();
        let text = |file: &str| -> String {
            source(file)
                .or_else(|| embedded::embedded(file).map(str::to_string))
                .unwrap_or_default()
        };

        let phone_templates = parse_phone_templates(
            "phone_patterns.txt",
            &text("phone_patterns.txt"),
            &mut warnings,
        );
        let position_patterns = parse_patterns(
            "position_patterns.txt",
            &text("position_patterns.txt"),
            &mut warnings,
        );

        Self {
            internal_domains: entries(&text("internal_domains.txt")).collect(),
            blacklist: entries(&text("blacklist.txt")).collect(),
            internal_markers: entries(&text("internal_markers.txt")).collect(),
            company_blacklist: entries(&text("company_blacklist.txt")).collect(),
            address_blacklist: entries(&text("address_blacklist.txt")).collect(),
            stop_words_person: entries(&text("stop_words_person.txt")).collect(),
            stop_words_org: entries(&text("stop_words_org.txt")).collect(),
            signature_markers: entries(&text("signature_markers.txt")).collect(),
            phone_templates,
            position_patterns,
            position_keywords: entries(&text("position_keywords.txt")).collect(),
            position_modifiers: entries(&text("position_modifiers.txt")).collect(),
            position_continuations: entries(&text("position_continuations.txt")).collect(),
            mobile_codes: entries(&text("mobile_codes.txt")).collect(),
            warnings,
        }
    }

    /// Whether an address belongs to the operating organization: listed in
    /// the blacklist, or on an internal domain or one of its subdomains.
    pub fn is_internal_email(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        if self.blacklist.contains(&email) {
            return true;
        }
        let Some((_, domain)) = email.rsplit_once('@') else {
            return false;
        };
        self.internal_domains.iter().any(|internal| {
            domain == internal
                || domain
                    .strip_suffix(internal.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }

    /// Whether a line carries one of our own signature markers.
    pub fn contains_internal_marker(&self, line: &str) -> bool {
        let line = line.to_lowercase();
        self.internal_markers.iter().any(|m| line.contains(m.as_str()))
    }

    pub fn is_blacklisted_company(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.company_blacklist.iter().any(|b| text.contains(b.as_str()))
    }

    pub fn is_blacklisted_address(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.address_blacklist.iter().any(|b| text.contains(b.as_str()))
    }

    pub fn is_person_stop_word(&self, text: &str) -> bool {
        matches_stop_word(&self.stop_words_person, text)
    }

    pub fn is_org_stop_word(&self, text: &str) -> bool {
        matches_stop_word(&self.stop_words_org, text)
    }

    pub fn is_mobile_code(&self, code: &str) -> bool {
        self.mobile_codes.contains(code)
    }

    pub fn matches_position_pattern(&self, text: &str) -> bool {
        self.position_patterns.iter().any(|re| re.is_match(text))
    }

    pub fn signature_markers(&self) -> &[String] {
        &self.signature_markers
    }

    pub fn phone_templates(&self) -> &[PhoneTemplate] {
        &self.phone_templates
    }

    pub fn position_keywords(&self) -> &[String] {
        &self.position_keywords
    }

    pub fn position_modifiers(&self) -> &[String] {
        &self.position_modifiers
    }

    pub fn position_continuations(&self) -> &[String] {
        &self.position_continuations
    }

    /// Diagnostics for lines that were skipped while loading.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Entry counts per resource file, for display.
    pub fn summary(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("internal_domains.txt", self.internal_domains.len()),
            ("blacklist.txt", self.blacklist.len()),
            ("internal_markers.txt", self.internal_markers.len()),
            ("company_blacklist.txt", self.company_blacklist.len()),
            ("address_blacklist.txt", self.address_blacklist.len()),
            ("stop_words_person.txt", self.stop_words_person.len()),
            ("stop_words_org.txt", self.stop_words_org.len()),
            ("signature_markers.txt", self.signature_markers.len()),
            ("phone_patterns.txt", self.phone_templates.len()),
            ("position_patterns.txt", self.position_patterns.len()),
            ("position_keywords.txt", self.position_keywords.len()),
            ("position_modifiers.txt", self.position_modifiers.len()),
            ("position_continuations.txt", self.position_continuations.len()),
            ("mobile_codes.txt", self.mobile_codes.len()),
        ]
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::embedded()
    }
}

/// Non-comment, non-blank lines, trimmed and lower-cased.
fn entries(text: &str) -> impl Iterator<Item = String> + '_ {
    raw_lines(text).map(|(_, line)| line.to_lowercase())
}

/// Non-comment, non-blank lines with their 1-based line numbers.
fn raw_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

fn matches_stop_word(stop_words: &[String], text: &str) -> bool {
    let text = text.trim().to_lowercase();
    stop_words
        .iter()
        .any(|w| text == *w || (w.chars().count() > 3 && text.contains(w.as_str())))
}

fn parse_patterns(file: &str, text: &str, warnings: &mut Vec<String>) -> Vec<Regex> {
    raw_lines(text)
        .filter_map(|(line, pattern)| match Regex::new(pattern) {
            Ok(re) => Some(re),
            Err(source) => {
                record(warnings, LexiconError::PatternCompile { file: file.to_string(), line, source });
                None
            }
        })
        .collect()
}

fn parse_phone_templates(file: &str, text: &str, warnings: &mut Vec<String>) -> Vec<PhoneTemplate> {
    let mut templates = Vec::new();
    for (line, entry) in raw_lines(text) {
        let Some((class, pattern)) = entry.split_once(char::is_whitespace) else {
            record(
                warnings,
                LexiconError::UnknownTemplateClass {
                    file: file.to_string(),
                    line,
                    class: entry.to_string(),
                },
            );
            continue;
        };

        let Some(class) = TemplateClass::parse(class) else {
            record(
                warnings,
                LexiconError::UnknownTemplateClass {
                    file: file.to_string(),
                    line,
                    class: class.to_string(),
                },
            );
            continue;
        };

        match Regex::new(pattern.trim()) {
            Ok(regex) => templates.push(PhoneTemplate { class, regex }),
            Err(source) => record(
                warnings,
                LexiconError::PatternCompile { file: file.to_string(), line, source },
            ),
        }
    }
    templates
}

fn record(warnings: &mut Vec<String>, error: LexiconError) {
    warn!("Skipping resource line: {}", error);
    warnings.push(error.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_embedded_defaults_load_cleanly() {
        let lexicon = Lexicon::embedded();
        assert!(lexicon.warnings().is_empty(), "{:?}", lexicon.warnings());
        assert!(!lexicon.phone_templates().is_empty());
        assert!(lexicon.is_mobile_code("977"));
        assert!(!lexicon.is_mobile_code("495"));
    }

    #[test]
    fn test_internal_email_matches_subdomains() {
        let lexicon = Lexicon::embedded();
        assert!(lexicon.is_internal_email("ivanov@dna-technology.ru"));
        assert!(lexicon.is_internal_email("Sales@Mail.DNA-Technology.ru"));
        assert!(lexicon.is_internal_email("noreply@dna-technology.ru"));
        assert!(!lexicon.is_internal_email("ivanov@notdna-technology.ru"));
        assert!(!lexicon.is_internal_email("client@example.ru"));
        assert!(!lexicon.is_internal_email("not an address"));
    }

    #[test]
    fn test_malformed_pattern_is_skipped() {
        let lexicon = Lexicon::from_overrides(&[
            ("phone_patterns.txt", "mobile (?P<code>9\\d{2}\nbogus \\d+\nlandline \\b8(?P<code>\\d{3})(?P<num1>\\d{7})\\b\n"),
            ("position_patterns.txt", "директор\n(unclosed\n"),
        ]);
        assert_eq!(lexicon.phone_templates().len(), 1);
        assert_eq!(lexicon.phone_templates()[0].class, TemplateClass::Landline);
        assert!(lexicon.matches_position_pattern("директор"));
        assert_eq!(lexicon.warnings().len(), 3);
        assert!(lexicon.warnings()[0].contains("phone_patterns.txt:1"));
    }

    #[test]
    fn test_stop_words_exact_and_contained() {
        let lexicon = Lexicon::from_overrides(&[("stop_words_person.txt", "# comment\nип\nотдел продаж\n")]);
        assert!(lexicon.is_person_stop_word("ИП"));
        assert!(lexicon.is_person_stop_word("Руководитель Отдел Продаж"));
        // short stop words only match exactly
        assert!(!lexicon.is_person_stop_word("Липатов Иван"));
    }

    #[test]
    fn test_from_dir_overrides_subset() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("internal_domains.txt"), "corp.example\n").unwrap();

        let lexicon = Lexicon::from_dir(dir.path()).unwrap();
        assert!(lexicon.is_internal_email("a@corp.example"));
        assert!(!lexicon.is_internal_email("a@dna-technology.ru"));
        // untouched files keep their defaults
        assert!(lexicon.is_mobile_code("916"));
    }
}
