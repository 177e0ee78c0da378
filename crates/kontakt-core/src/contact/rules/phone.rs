//! Phone number discovery and canonicalization.
//!
//! Numbers are found with the configured templates, tried in priority order,
//! and rendered as `+7 (AAA) NNN-NN-NN[ (доб. D)]`. Mobile numbers never
//! carry an extension.

use std::borrow::Cow;
use std::sync::Arc;

use regex::Captures;
use tracing::{debug, trace};

use crate::lexicon::{Lexicon, PhoneTemplate};
use crate::models::config::PhoneConfig;

use super::patterns::{CITY_AFTER, COMMA_SHORT_FORM, EXTENSION, SCIENTIFIC_NUMBER, VARIANT_SUFFIX};
use super::{ExtractionMatch, FieldExtractor};

/// Russian numbers have ten national digits (area code + subscriber).
const NATIONAL_DIGITS: usize = 10;

fn is_ascii_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// The kind of number a template is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateClass {
    /// Three-digit area code.
    Mobile,
    /// Three to five digit area code.
    Landline,
    /// Area code split in two groups, e.g. `8 (34-3) ...`.
    Compound,
}

impl TemplateClass {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "mobile" => Some(Self::Mobile),
            "landline" => Some(Self::Landline),
            "compound" => Some(Self::Compound),
            _ => None,
        }
    }
}

/// Mobile/landline classification of a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberClass {
    Mobile,
    Landline,
}

/// A normalized Russian phone number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber {
    /// Area code, 3-5 digits.
    pub area_code: String,
    /// Subscriber number; area code + subscriber is always 10 digits.
    pub subscriber: String,
    /// Extension, landline numbers only.
    pub extension: Option<String>,
    pub class: NumberClass,
}

impl PhoneNumber {
    /// Ten national digits.
    pub fn digits(&self) -> String {
        format!("{}{}", self.area_code, self.subscriber)
    }

    pub fn is_mobile(&self) -> bool {
        self.class == NumberClass::Mobile
    }

    /// Canonical `+7 (AAA) NNN-NN-NN[ (доб. D)]` rendering.
    pub fn canonical(&self) -> String {
        let s = &self.subscriber;
        let grouped = match s.len() {
            _ if !s.is_ascii() => s.clone(),
            7 => format!("{}-{}-{}", &s[..3], &s[3..5], &s[5..]),
            6 => format!("{}-{}-{}", &s[..2], &s[2..4], &s[4..]),
            5 => format!("{}-{}-{}", &s[..1], &s[1..3], &s[3..]),
            _ => s.clone(),
        };

        let mut out = format!("+7 ({}) {}", self.area_code, grouped);
        if let (NumberClass::Landline, Some(ext)) = (self.class, &self.extension) {
            out.push_str(&format!(" (доб. {})", ext));
        }
        out
    }

    /// Same number with the last two digits replaced.
    fn with_last_two(&self, tail: &str) -> Self {
        let chars: Vec<char> = self.subscriber.chars().collect();
        let head: String = chars[..chars.len().saturating_sub(2)].iter().collect();
        Self {
            area_code: self.area_code.clone(),
            subscriber: format!("{}{:0>2}", head, tail),
            extension: None,
            class: self.class,
        }
    }
}

/// Phone field extractor driven by the lexicon's templates.
pub struct PhoneExtractor {
    lexicon: Arc<Lexicon>,
    context_before: usize,
    context_after: usize,
    synthesize_variants: bool,
}

impl PhoneExtractor {
    /// Create a new phone extractor with the default local windows.
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self::from_config(lexicon, &PhoneConfig::default())
    }

    pub fn from_config(lexicon: Arc<Lexicon>, config: &PhoneConfig) -> Self {
        Self {
            lexicon,
            context_before: config.context_before,
            context_after: config.context_after,
            synthesize_variants: config.synthesize_variants,
        }
    }

    /// Set the extension search window, in characters around a number.
    pub fn with_context(mut self, before: usize, after: usize) -> Self {
        self.context_before = before;
        self.context_after = after;
        self
    }

    /// Set whether `(48)`-style sibling numbers are synthesized.
    pub fn with_variants(mut self, synthesize: bool) -> Self {
        self.synthesize_variants = synthesize;
        self
    }

    /// Canonical phone strings in text order, each appearing once.
    pub fn extract_phones(&self, text: &str) -> Vec<String> {
        self.extract_all(text)
            .into_iter()
            .map(|m| m.value.canonical())
            .collect()
    }

    fn classify(&self, area_code: &str) -> NumberClass {
        if area_code.len() == 3 && self.lexicon.is_mobile_code(area_code) {
            NumberClass::Mobile
        } else {
            NumberClass::Landline
        }
    }

    /// Build a number from a template match, enforcing the digit constraints.
    fn number_from(&self, template: &PhoneTemplate, caps: &Captures) -> Option<PhoneNumber> {
        let group = |name: &str| caps.name(name).map(|m| m.as_str()).unwrap_or("");

        let area_code = match template.class {
            TemplateClass::Compound => format!("{}{}", group("code1"), group("code2")),
            _ => group("code").to_string(),
        };
        if !(3..=5).contains(&area_code.len()) || !is_ascii_digits(&area_code) {
            return None;
        }
        if template.class == TemplateClass::Mobile && area_code.len() != 3 {
            return None;
        }

        let mut subscriber = String::new();
        for name in ["num1", "num2", "num3"] {
            match caps.name(name) {
                Some(m) if !is_ascii_digits(m.as_str()) => return None,
                Some(m) => subscriber.push_str(m.as_str()),
                None if name == "num3" => {}
                None => return None,
            }
        }

        if area_code.len() + subscriber.len() != NATIONAL_DIGITS {
            trace!("Rejecting {}{}: not ten digits", area_code, subscriber);
            return None;
        }

        let class = self.classify(&area_code);
        let extension = caps
            .name("ext")
            .map(|m| m.as_str().to_string())
            .filter(|ext| class == NumberClass::Landline && is_ascii_digits(ext));

        Some(PhoneNumber { area_code, subscriber, extension, class })
    }

    /// Collect template matches, skipping repeats and overlapping spans.
    fn match_templates(&self, text: &str) -> Vec<ExtractionMatch<PhoneNumber>> {
        let mut accepted: Vec<ExtractionMatch<PhoneNumber>> = Vec::new();

        for template in self.lexicon.phone_templates() {
            for caps in template.regex.captures_iter(text) {
                let Some(full) = caps.get(0) else { continue };
                let Some(number) = self.number_from(template, &caps) else {
                    continue;
                };

                let digits = number.digits();
                if accepted.iter().any(|a| a.value.digits() == digits) {
                    continue;
                }
                if accepted.iter().any(|a| a.overlaps(full.start(), full.end())) {
                    continue;
                }

                let confidence = match number.class {
                    NumberClass::Mobile => 0.95,
                    NumberClass::Landline => 0.9,
                };
                accepted.push(
                    ExtractionMatch::new(number, confidence, full.as_str())
                        .with_position(full.start(), full.end()),
                );
            }
        }

        accepted.sort_by_key(|m| m.position.map(|(s, _)| s).unwrap_or(0));
        accepted
    }

    /// Attach free-standing extension keywords to the nearest number.
    ///
    /// An extension after a number binds to it within `context_after`
    /// characters; otherwise it binds to the next number within
    /// `context_before`. Only landline numbers keep one.
    fn attach_extensions(&self, text: &str, numbers: &mut [ExtractionMatch<PhoneNumber>]) {
        for caps in EXTENSION.captures_iter(text) {
            let (Some(full), Some(ext)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if numbers.iter().any(|n| n.overlaps(full.start(), full.end())) {
                continue;
            }

            let preceding = numbers
                .iter()
                .rposition(|n| n.position.is_some_and(|(_, end)| end <= full.start()))
                .filter(|&i| {
                    let end = numbers[i].position.map(|(_, e)| e).unwrap_or(0);
                    text[end..full.start()].chars().count() <= self.context_after
                });
            let target = preceding.or_else(|| {
                numbers
                    .iter()
                    .position(|n| n.position.is_some_and(|(start, _)| start >= full.end()))
                    .filter(|&i| {
                        let start = numbers[i].position.map(|(s, _)| s).unwrap_or(text.len());
                        text[full.end()..start].chars().count() <= self.context_before
                    })
            });

            let Some(number) = target.map(|i| &mut numbers[i].value) else {
                continue;
            };
            if number.is_mobile() {
                debug!("Dropping extension {} near mobile {}", ext.as_str(), number.digits());
                continue;
            }
            if number.extension.is_none() {
                number.extension = Some(ext.as_str().to_string());
            }
        }
    }

    /// Numbers implied by text right after a match: `(48)` variants and
    /// comma-separated short forms sharing the area code.
    fn expand_siblings(
        &self,
        text: &str,
        numbers: Vec<ExtractionMatch<PhoneNumber>>,
    ) -> Vec<ExtractionMatch<PhoneNumber>> {
        let spans: Vec<(usize, usize)> = numbers.iter().filter_map(|n| n.position).collect();
        let mut out: Vec<ExtractionMatch<PhoneNumber>> = Vec::with_capacity(numbers.len());

        for mut primary in numbers {
            let Some((_, end)) = primary.position else {
                out.push(primary);
                continue;
            };
            let mut siblings = Vec::new();
            let rest = &text[end..];

            if self.synthesize_variants && primary.value.class == NumberClass::Landline {
                if let Some(caps) = VARIANT_SUFFIX.captures(rest) {
                    let sibling = primary.value.with_last_two(&caps[1]);
                    let m = &caps[0];
                    siblings.push(
                        ExtractionMatch::new(sibling, 0.7, m.trim())
                            .with_position(end, end + m.len()),
                    );
                }
            }

            let mut cursor = end;
            while let Some(caps) = COMMA_SHORT_FORM.captures(&text[cursor..]) {
                let len = caps[0].len();
                if spans.iter().any(|&(s, e)| s < cursor + len && cursor < e) {
                    break;
                }
                if CITY_AFTER.is_match(&text[cursor + len..]) {
                    trace!("Short form {} is a postal code", caps[0].trim());
                    break;
                }
                let short = format!("{}{}{}", &caps[1], &caps[2], &caps[3]);
                let Some(sibling) = self.short_form_sibling(&mut primary.value, &short) else {
                    break;
                };
                siblings.push(
                    ExtractionMatch::new(sibling, 0.7, caps[0].trim())
                        .with_position(cursor, cursor + len),
                );
                cursor += len;
            }

            out.push(primary);
            for sibling in siblings {
                if out.iter().any(|n| n.value.digits() == sibling.value.digits()) {
                    continue;
                }
                out.push(sibling);
            }
        }

        out
    }

    /// Rebuild a comma-separated short form against its primary.
    ///
    /// With a five-digit area code the last two code digits are the shared
    /// start of both subscriber numbers, so the primary is rewritten to a
    /// three-digit code as well.
    fn short_form_sibling(&self, primary: &mut PhoneNumber, short: &str) -> Option<PhoneNumber> {
        if !is_ascii_digits(short) {
            return None;
        }
        if primary.area_code.len() == 5 && short.len() == 5 {
            let (code, prefix) = primary.area_code.split_at(3);
            let (code, prefix) = (code.to_string(), prefix.to_string());
            primary.subscriber = format!("{}{}", prefix, primary.subscriber);
            primary.area_code = code.clone();
            primary.class = self.classify(&code);
            if primary.is_mobile() {
                primary.extension = None;
            }
            return Some(PhoneNumber {
                class: primary.class,
                area_code: code,
                subscriber: format!("{}{}", prefix, short),
                extension: None,
            });
        }

        if primary.area_code.len() + short.len() == NATIONAL_DIGITS {
            return Some(PhoneNumber {
                area_code: primary.area_code.clone(),
                subscriber: short.to_string(),
                extension: None,
                class: primary.class,
            });
        }

        None
    }
}

impl FieldExtractor for PhoneExtractor {
    type Output = ExtractionMatch<PhoneNumber>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let text = expand_scientific(text);

        let mut numbers = self.match_templates(&text);
        self.attach_extensions(&text, &mut numbers);
        let mut numbers = self.expand_siblings(&text, numbers);

        // Mobile numbers never keep an extension.
        for number in &mut numbers {
            if number.value.is_mobile() {
                number.value.extension = None;
            }
        }

        debug!("Found {} phone numbers", numbers.len());
        numbers
    }
}

/// Expand `7.9131234567E+10` style numbers back to plain digits.
pub fn expand_scientific(text: &str) -> Cow<'_, str> {
    SCIENTIFIC_NUMBER.replace_all(text, |caps: &Captures| {
        let exponent: usize = caps[3].parse().unwrap_or(0);
        let fraction = &caps[2];
        if fraction.len() > exponent {
            return caps[0].to_string();
        }
        format!("{}{}{}", &caps[1], fraction, "0".repeat(exponent - fraction.len()))
    })
}
