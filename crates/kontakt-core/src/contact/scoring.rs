//! Completeness scoring and the acceptance gate.

use serde::{Deserialize, Serialize};

use crate::lexicon::Lexicon;
use crate::models::contact::Contact;

use super::rules::is_valid_email;

pub const FIO_WEIGHT: f64 = 0.30;
pub const POSITION_WEIGHT: f64 = 0.10;
pub const COMPANY_WEIGHT: f64 = 0.20;
pub const PHONE_WEIGHT: f64 = 0.20;
pub const EMAIL_WEIGHT: f64 = 0.10;
pub const ADDRESS_WEIGHT: f64 = 0.10;

/// Why a candidate failed the acceptance gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateRejection {
    /// The email belongs to the operating organization.
    InternalEmail,
    /// Neither a name nor a company.
    NoIdentity,
    /// Neither a valid email nor a phone.
    NoContactMethod,
}

impl std::fmt::Display for GateRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateRejection::InternalEmail => write!(f, "internal email"),
            GateRejection::NoIdentity => write!(f, "no name or company"),
            GateRejection::NoContactMethod => write!(f, "no email or phone"),
        }
    }
}

/// Weighted completeness score, rounded to two decimals, and the issues
/// for every unsatisfied component.
pub fn score(contact: &Contact) -> (f64, Vec<String>) {
    let mut total = 0.0;
    let mut issues = Vec::new();

    let mut component = |present: bool, weight: f64, issue: &str| {
        if present {
            total += weight;
        } else {
            issues.push(issue.to_string());
        }
    };

    component(
        contact.fio.split_whitespace().count() >= 2,
        FIO_WEIGHT,
        "Full name missing or incomplete",
    );
    component(!contact.position.trim().is_empty(), POSITION_WEIGHT, "Position not found");
    component(!contact.company.trim().is_empty(), COMPANY_WEIGHT, "Company not found");
    component(!contact.phones.is_empty(), PHONE_WEIGHT, "No phone numbers found");
    component(contact.email.contains('@'), EMAIL_WEIGHT, "Email not found");
    component(!contact.address.trim().is_empty(), ADDRESS_WEIGHT, "Address not found");

    ((total * 100.0).round() / 100.0, issues)
}

/// Acceptance gate, independent of the score.
pub fn gate(contact: &Contact, lexicon: &Lexicon) -> Result<(), GateRejection> {
    if !contact.email.is_empty() && lexicon.is_internal_email(&contact.email) {
        return Err(GateRejection::InternalEmail);
    }

    let has_identity = !contact.fio.trim().is_empty() || !contact.company.trim().is_empty();
    if !has_identity {
        return Err(GateRejection::NoIdentity);
    }

    let has_contact_method = is_valid_email(&contact.email) || !contact.phones.is_empty();
    if !has_contact_method {
        return Err(GateRejection::NoContactMethod);
    }

    Ok(())
}
