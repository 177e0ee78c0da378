//! Contact assembly: one signature block in, one scored contact out.

use std::sync::Arc;

use chrono::NaiveDateTime;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::lexicon::Lexicon;
use crate::models::config::KontaktConfig;
use crate::models::contact::{Contact, SIGNATURE_SOURCE};
use crate::ner::{is_name_shape, EntityExtractor, EntityTagger};

use super::rules::{
    extract_emails, FieldExtractor, InnExtractor, PhoneExtractor, CITY_ABBREVIATED, CITY_SPELLED,
    COMPANY_CUTS, COMPANY_LABEL,
};
use super::scoring::{gate, score, GateRejection};

lazy_static! {
    static ref CAPITALIZED: Regex = Regex::new(r"^[А-ЯЁ][а-яё]+$").unwrap();
    static ref CITY_TOKEN: Regex = Regex::new(r"^[А-ЯЁ][а-яё\-]+$").unwrap();
    static ref POSITION_LEADING_JUNK: Regex = Regex::new(r"^[\d><@#$%]").unwrap();
}

const DATE_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Department words that may follow a title in capitalized form.
const DEPARTMENT_WORDS: &[&str] = &["отдела", "отделом", "группы", "департамента"];

const PERSON_JUNK: &[&str] = &[
    "центр лабораторной", "telegram:", "subject:", "от кого", "компания", "youtube", "rutube",
];

const POSITION_JUNK: &[&str] = &[
    "subject:", "от кого", "telegram:", "отправлено", "youtube", "rutube", "при запросе на счет",
];

/// Capitalized words that are verbs or labels, never city names.
const CITY_JUNK: &[&str] = &["настоящим", "просим", "закупка", "содержат", "заказчик"];

/// Message context attached to every contact from one message.
#[derive(Debug, Clone, Copy, Default)]
pub struct Provenance<'a> {
    pub subject: &'a str,
    pub date: &'a str,
    /// External participant address used when the block has none.
    pub fallback_email: Option<&'a str>,
}

/// Raw field candidates found in one block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockFields {
    pub persons: Vec<String>,
    pub positions: Vec<String>,
    pub organizations: Vec<String>,
    pub addresses: Vec<String>,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
    pub inn: Option<String>,
}

/// Outcome of assembling one block.
#[derive(Debug, Clone, PartialEq)]
pub enum Assembly {
    Accepted(Contact),
    Rejected { reason: GateRejection, score: f64 },
}

impl Assembly {
    pub fn accepted(self) -> Option<Contact> {
        match self {
            Assembly::Accepted(contact) => Some(contact),
            Assembly::Rejected { .. } => None,
        }
    }
}

/// Combines entity, phone, email and INN extraction into contacts.
pub struct ContactAssembler {
    lexicon: Arc<Lexicon>,
    entities: EntityExtractor,
    phones: PhoneExtractor,
    inn: InnExtractor,
    date_offset_hours: i64,
}

impl ContactAssembler {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self::from_config(lexicon, &KontaktConfig::default())
    }

    pub fn from_config(lexicon: Arc<Lexicon>, config: &KontaktConfig) -> Self {
        Self {
            entities: EntityExtractor::new(lexicon.clone()),
            phones: PhoneExtractor::from_config(lexicon.clone(), &config.phones),
            inn: InnExtractor::new().with_validation(config.extraction.validate_inn),
            date_offset_hours: config.extraction.date_offset_hours,
            lexicon,
        }
    }

    /// Replace the named-entity backend.
    pub fn with_tagger(mut self, tagger: impl EntityTagger + 'static) -> Self {
        self.entities = self.entities.with_tagger(tagger);
        self
    }

    pub fn with_date_offset(mut self, hours: i64) -> Self {
        self.date_offset_hours = hours;
        self
    }

    /// Run every field extractor over a block.
    pub fn fields(&self, block: &str) -> BlockFields {
        let entities = self.entities.extract(block);
        BlockFields {
            persons: entities.persons,
            positions: entities.positions,
            organizations: entities.organizations,
            addresses: entities.locations,
            emails: extract_emails(block),
            phones: self.phones.extract_phones(block),
            inn: self.inn.extract(block).map(|m| m.value),
        }
    }

    pub fn assemble(&self, block: &str, provenance: &Provenance<'_>) -> Assembly {
        self.assemble_fields(&self.fields(block), provenance)
    }

    /// Select, clean and validate fields, then score and gate the contact.
    pub fn assemble_fields(&self, fields: &BlockFields, provenance: &Provenance<'_>) -> Assembly {
        let fio = fields
            .persons
            .iter()
            .find(|p| self.is_valid_fio(p))
            .cloned()
            .unwrap_or_default();

        let position = fields
            .positions
            .iter()
            .map(|p| clean_position(p))
            .find(|p| is_valid_position(p))
            .unwrap_or_default();

        let company = fields
            .organizations
            .iter()
            .map(|c| clean_company(c))
            .find(|c| c.chars().count() >= 3 && !self.lexicon.is_blacklisted_company(c))
            .unwrap_or_default();

        let mut address = String::new();
        for candidate in &fields.addresses {
            let candidate = candidate.trim();
            if candidate.chars().count() >= 5
                && !self.lexicon.is_blacklisted_address(candidate)
                && candidate.chars().count() > address.chars().count()
            {
                address = candidate.to_string();
            }
        }

        let email = fields
            .emails
            .iter()
            .find(|e| !self.lexicon.is_internal_email(e))
            .map(String::as_str)
            .or(provenance.fallback_email)
            .unwrap_or_default()
            .to_string();

        let mut contact = Contact {
            city: city_from_address(&address),
            fio,
            position,
            company,
            email,
            phones: fields.phones.clone(),
            address,
            inn: fields.inn.clone(),
            source: SIGNATURE_SOURCE.to_string(),
            email_date: shift_date(provenance.date, self.date_offset_hours),
            email_subject: provenance.subject.to_string(),
            ..Contact::default()
        };

        let (value, issues) = score(&contact);
        contact.confidence_score = value;
        contact.issues = issues;

        match gate(&contact, &self.lexicon) {
            Ok(()) => {
                debug!(
                    "Assembled contact {:?} <{}> ({:.2})",
                    contact.fio, contact.email, contact.confidence_score
                );
                Assembly::Accepted(contact)
            }
            Err(reason) => {
                debug!("Candidate rejected: {} ({:.2})", reason, value);
                Assembly::Rejected { reason, score: value }
            }
        }
    }

    fn is_valid_fio(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        is_name_shape(name)
            && !self.lexicon.is_person_stop_word(name)
            && !PERSON_JUNK.iter().any(|j| lower.contains(j))
    }
}

/// Cut a title where the signer's own name begins: a capitalized word,
/// not a department word, followed by another capitalized word.
pub fn clean_position(position: &str) -> String {
    let words: Vec<&str> = position.split_whitespace().collect();
    let mut end = words.len();

    for i in 1..words.len() {
        let word = words[i];
        let starts_name = CAPITALIZED.is_match(word)
            && word.chars().count() > 3
            && !DEPARTMENT_WORDS.contains(&word.to_lowercase().as_str())
            && words.get(i + 1).is_some_and(|next| CAPITALIZED.is_match(next));
        if starts_name {
            end = i;
            break;
        }
    }

    words[..end].join(" ")
}

fn is_valid_position(position: &str) -> bool {
    let lower = position.to_lowercase();
    position.chars().count() >= 3
        && !POSITION_LEADING_JUNK.is_match(&lower)
        && !POSITION_JUNK.iter().any(|j| lower.contains(j))
}

/// Strip label prefixes and INN/KPP/postal-code tails.
pub fn clean_company(company: &str) -> String {
    let mut company = COMPANY_LABEL.replace(company, "").into_owned();
    for cut in COMPANY_CUTS.iter() {
        company = cut.replace(&company, "").into_owned();
    }
    company.trim().to_string()
}

/// The city named in an address, or an empty string.
pub fn city_from_address(address: &str) -> String {
    for pattern in [&*CITY_ABBREVIATED, &*CITY_SPELLED] {
        if let Some(caps) = pattern.captures(address) {
            let city = &caps[1];
            if city.chars().count() > 2 && !CITY_JUNK.contains(&city.to_lowercase().as_str()) {
                return city.to_string();
            }
        }
    }

    let first_part = address.split(',').next().unwrap_or_default();
    first_part
        .split_whitespace()
        .find(|w| {
            CITY_TOKEN.is_match(w)
                && w.chars().count() > 3
                && !CITY_JUNK.contains(&w.to_lowercase().as_str())
        })
        .map(str::to_string)
        .unwrap_or_default()
}

/// Shift a `%d.%m.%Y %H:%M` date by whole hours; other formats pass through.
pub fn shift_date(date: &str, hours: i64) -> String {
    if hours == 0 {
        return date.to_string();
    }
    match NaiveDateTime::parse_from_str(date.trim(), DATE_FORMAT) {
        Ok(dt) => (dt + chrono::Duration::hours(hours)).format(DATE_FORMAT).to_string(),
        Err(_) => date.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn assembler() -> ContactAssembler {
        ContactAssembler::new(Arc::new(Lexicon::embedded()))
    }

    #[test]
    fn test_title_and_name_block() {
        let provenance = Provenance {
            subject: "КП",
            date: "29.07.2025 10:10",
            fallback_email: Some("ivanov@vector.ru"),
        };
        let contact = assembler()
            .assemble("Директор по продажам\nИванов Иван Иванович", &provenance)
            .accepted()
            .unwrap();

        assert_eq!(contact.fio, "Иванов Иван Иванович");
        assert!(contact.position.contains("Директор по продажам"));
        assert_eq!(contact.email, "ivanov@vector.ru");
        assert_eq!(contact.confidence_score, 0.5);
        assert_eq!(contact.source, "email_signature");
        assert_eq!(contact.email_date, "29.07.2025 10:10");
        assert_eq!(contact.email_subject, "КП");
    }

    #[test]
    fn test_full_signature_block() {
        let block = "Директор по продажам\nИванов Иван Иванович\nООО «Вектор»\nг. Новосибирск, ул. Ленина, д. 5\nТел. 8 (383) 212-34-56\nivanov@vector.ru\nИНН 5407123456";
        let contact = assembler()
            .assemble(block, &Provenance::default())
            .accepted()
            .unwrap();

        assert_eq!(contact.company, "ООО «Вектор»");
        assert_eq!(contact.address, "г. Новосибирск, ул. Ленина, д. 5");
        assert_eq!(contact.city, "Новосибирск");
        assert_eq!(contact.phones, vec!["+7 (383) 212-34-56".to_string()]);
        assert_eq!(contact.email, "ivanov@vector.ru");
        assert_eq!(contact.inn.as_deref(), Some("5407123456"));
        assert_eq!(contact.confidence_score, 1.0);
        assert!(contact.issues.is_empty());
    }

    #[test]
    fn test_block_email_preferred_over_fallback() {
        let fields = BlockFields {
            persons: vec!["Иванов Иван".to_string()],
            emails: vec!["sales@dna-technology.ru".to_string(), "ivanov@vector.ru".to_string()],
            ..BlockFields::default()
        };
        let provenance = Provenance {
            fallback_email: Some("other@vector.ru"),
            ..Provenance::default()
        };
        let contact = assembler().assemble_fields(&fields, &provenance).accepted().unwrap();
        assert_eq!(contact.email, "ivanov@vector.ru");
    }

    #[test]
    fn test_internal_fallback_is_rejected() {
        let fields = BlockFields {
            persons: vec!["Иванов Иван".to_string()],
            phones: vec!["+7 (383) 212-34-56".to_string()],
            ..BlockFields::default()
        };
        let provenance = Provenance {
            fallback_email: Some("manager@dna-technology.ru"),
            ..Provenance::default()
        };
        assert_eq!(
            assembler().assemble_fields(&fields, &provenance),
            Assembly::Rejected {
                reason: GateRejection::InternalEmail,
                score: 0.6
            }
        );
    }

    #[test]
    fn test_no_contact_method() {
        let fields = BlockFields {
            persons: vec!["Иванов Иван".to_string()],
            ..BlockFields::default()
        };
        assert!(matches!(
            assembler().assemble_fields(&fields, &Provenance::default()),
            Assembly::Rejected { reason: GateRejection::NoContactMethod, .. }
        ));
    }

    #[test]
    fn test_invalid_fields_skipped() {
        let fields = BlockFields {
            persons: vec!["Best Regards".to_string(), "Петров Пётр".to_string()],
            positions: vec!["Subject: директор".to_string(), "Менеджер".to_string()],
            organizations: vec!["Telegram канал".to_string(), "Клиент: АО Ромашка, ИНН 5407123456".to_string()],
            addresses: vec!["Спасибо, г. Москва".to_string(), "ул. Мира".to_string()],
            emails: vec!["petrov@romashka.ru".to_string()],
            ..BlockFields::default()
        };
        let contact = assembler()
            .assemble_fields(&fields, &Provenance::default())
            .accepted()
            .unwrap();
        assert_eq!(contact.fio, "Петров Пётр");
        assert_eq!(contact.position, "Менеджер");
        assert_eq!(contact.company, "АО Ромашка");
        assert_eq!(contact.address, "ул. Мира");
    }

    #[test]
    fn test_clean_position() {
        assert_eq!(clean_position("Менеджер отдела продаж Иванов Иван"), "Менеджер отдела продаж");
        assert_eq!(clean_position("Начальник Отдела Снабжения"), "Начальник Отдела Снабжения");
        assert_eq!(clean_position("Директор по продажам"), "Директор по продажам");
    }

    #[test]
    fn test_clean_company() {
        assert_eq!(clean_company("Заказчик: ООО Вектор, ИНН 5407123456"), "ООО Вектор");
        assert_eq!(clean_company("АО Сибирь 630099, г. Новосибирск"), "АО Сибирь");
        assert_eq!(clean_company("ООО Вектор, КПП 540701001"), "ООО Вектор");
    }

    #[test]
    fn test_city_from_address() {
        assert_eq!(city_from_address("630099, г. Новосибирск, ул. Ленина"), "Новосибирск");
        assert_eq!(city_from_address("город Томск, пр. Ленина"), "Томск");
        assert_eq!(city_from_address("Барнаул, ул. Мира, д. 1"), "Барнаул");
        assert_eq!(city_from_address("д. 1, оф. 2"), "");
    }

    #[test]
    fn test_shift_date() {
        assert_eq!(shift_date("29.07.2025 22:10", 4), "30.07.2025 02:10");
        assert_eq!(shift_date("yesterday", 4), "yesterday");
        assert_eq!(shift_date("29.07.2025 22:10", 0), "29.07.2025 22:10");
    }
}
