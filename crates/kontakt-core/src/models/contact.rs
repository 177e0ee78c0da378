//! Contact records and run statistics.

use serde::{Deserialize, Serialize};

/// Provenance tag for contacts taken from signature blocks.
pub const SIGNATURE_SOURCE: &str = "email_signature";

/// A contact assembled from one signature block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Full name (фамилия, имя, отчество), 2-4 capitalized tokens.
    pub fio: String,

    /// Job title.
    pub position: String,

    /// Organization name.
    pub company: String,

    /// External email address.
    pub email: String,

    /// Canonical phone numbers, unique by digits.
    pub phones: Vec<String>,

    /// Postal address as written in the signature.
    pub address: String,

    /// City derived from the address.
    pub city: String,

    /// Taxpayer ID (10 or 12 digits).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inn: Option<String>,

    /// Weighted completeness score in [0, 1], two decimals.
    pub confidence_score: f64,

    /// Unsatisfied score components.
    pub issues: Vec<String>,

    /// Where the record came from.
    pub source: String,

    /// Message date, optionally shifted by the configured offset.
    pub email_date: String,

    /// Message subject.
    pub email_subject: String,
}

impl Default for Contact {
    fn default() -> Self {
        Self {
            fio: String::new(),
            position: String::new(),
            company: String::new(),
            email: String::new(),
            phones: Vec::new(),
            address: String::new(),
            city: String::new(),
            inn: None,
            confidence_score: 0.0,
            issues: Vec::new(),
            source: SIGNATURE_SOURCE.to_string(),
            email_date: String::new(),
            email_subject: String::new(),
        }
    }
}

impl Contact {
    /// Identity used to merge duplicates: the normalized email, else the
    /// normalized name. `None` when the record has neither.
    pub fn dedup_key(&self) -> Option<String> {
        let email = self.email.trim().to_lowercase();
        if !email.is_empty() {
            return Some(email);
        }

        let fio = self
            .fio
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        if fio.is_empty() { None } else { Some(fio) }
    }
}

/// Aggregate counters for one extraction run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Messages handed to the run.
    pub processed: usize,
    /// Messages with only internal participants (skipped).
    pub internal: usize,
    /// Messages with at least one external participant.
    pub external: usize,
    /// Messages whose body could not be retrieved.
    pub missing_body: usize,
    /// Contacts that passed gate and threshold, before deduplication.
    pub accepted: usize,
    /// Candidates that failed the acceptance gate.
    pub rejected_by_gate: usize,
    /// Candidates that passed the gate but scored below the threshold.
    pub rejected_low_confidence: usize,
    /// Records merged away by deduplication (both passes).
    pub duplicates_removed: usize,
    /// Contacts in the final output.
    pub unique_contacts: usize,
    /// Per-kind message counters.
    pub original_messages: usize,
    pub replies: usize,
    pub forwards: usize,
    pub chains: usize,
}
