//! Message-level orchestration: participants, signature blocks, assembly,
//! threshold and deduplication.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::contact::rules::extract_emails;
use crate::contact::{dedupe, Assembly, ContactAssembler, Provenance};
use crate::error::{ExtractionError, Result};
use crate::lexicon::Lexicon;
use crate::models::config::KontaktConfig;
use crate::models::contact::{Contact, RunStats};
use crate::models::message::{MailMessage, MessageKind};
use crate::ner::EntityTagger;
use crate::signature::{classify_message, own_text, SignatureLocator};

/// Contacts and counters of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub contacts: Vec<Contact>,
    pub stats: RunStats,
}

/// The full extraction pipeline for one configuration.
pub struct ContactPipeline {
    config: KontaktConfig,
    lexicon: Arc<Lexicon>,
    locator: SignatureLocator,
    assembler: ContactAssembler,
}

impl ContactPipeline {
    pub fn new(config: KontaktConfig, lexicon: Arc<Lexicon>) -> Self {
        Self {
            locator: SignatureLocator::new(lexicon.clone()).with_config(config.signature.clone()),
            assembler: ContactAssembler::from_config(lexicon.clone(), &config),
            lexicon,
            config,
        }
    }

    /// Build a pipeline, loading the lexicon from the configured resource
    /// directory if there is one.
    pub fn from_config(config: KontaktConfig) -> Result<Self> {
        let lexicon = Lexicon::load(config.resources.dir.as_deref())?;
        Ok(Self::new(config, Arc::new(lexicon)))
    }

    /// Replace the named-entity backend.
    pub fn with_tagger(mut self, tagger: impl EntityTagger + 'static) -> Self {
        self.assembler = self.assembler.with_tagger(tagger);
        self
    }

    pub fn config(&self) -> &KontaktConfig {
        &self.config
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// External addresses among the message participants.
    ///
    /// Falls back to addresses in the signature region of the body when every
    /// header address is internal.
    pub fn external_participants(&self, message: &MailMessage) -> Vec<String> {
        let mut external: Vec<String> = Vec::new();

        for participant in &message.participants {
            let emails = extract_emails(participant);
            if emails.is_empty() {
                debug!("Ignoring participant without an address: {:?}", participant);
            }
            for email in emails {
                if !self.lexicon.is_internal_email(&email) && !external.contains(&email) {
                    external.push(email);
                }
            }
        }

        if external.is_empty() {
            if let Some(body) = message.body.as_deref() {
                external = self
                    .locator
                    .signature_emails(body)
                    .into_iter()
                    .filter(|e| !self.lexicon.is_internal_email(e))
                    .collect();
                if !external.is_empty() {
                    debug!("Message {}: participants found in signature", message.id);
                }
            }
        }

        external
    }

    /// Contacts from one message body, deduplicated within the message.
    pub fn extract_contacts(
        &self,
        body: &str,
        subject: &str,
        date: &str,
        external_emails: &[String],
    ) -> Vec<Contact> {
        self.extract_counted(body, subject, date, external_emails, &mut RunStats::default())
    }

    fn extract_counted(
        &self,
        body: &str,
        subject: &str,
        date: &str,
        external_emails: &[String],
        stats: &mut RunStats,
    ) -> Vec<Contact> {
        if body.trim().is_empty() {
            debug!("Empty body, nothing to extract");
            return Vec::new();
        }

        let body = truncate_chars(body, self.config.extraction.max_body_chars);
        let kind = classify_message(subject, body);
        match kind {
            MessageKind::Original => stats.original_messages += 1,
            MessageKind::Reply => stats.replies += 1,
            MessageKind::Forwarded => stats.forwards += 1,
            MessageKind::Chain => stats.chains += 1,
        }

        let text = own_text(kind, body);
        let provenance = Provenance {
            subject,
            date,
            fallback_email: external_emails.first().map(String::as_str),
        };

        let blocks = self.locator.locate(text);
        debug!("{} message: {} candidate blocks", kind, blocks.len());

        let mut contacts: Vec<Contact> = Vec::new();
        for block in &blocks {
            self.assemble_into(block, &provenance, &mut contacts, stats);
        }

        if contacts.is_empty() {
            if let Some(cleaned) = self.locator.deep_clean_body(text) {
                if !blocks.contains(&cleaned) {
                    debug!("No contact in signature blocks, trying the whole body");
                    self.assemble_into(&cleaned, &provenance, &mut contacts, stats);
                }
            }
        }

        let (contacts, removed) = dedupe(contacts);
        stats.duplicates_removed += removed;
        contacts
    }

    fn assemble_into(
        &self,
        block: &str,
        provenance: &Provenance<'_>,
        contacts: &mut Vec<Contact>,
        stats: &mut RunStats,
    ) {
        match self.assembler.assemble(block, provenance) {
            Assembly::Accepted(contact)
                if contact.confidence_score >= self.config.extraction.min_confidence =>
            {
                stats.accepted += 1;
                contacts.push(contact);
            }
            Assembly::Accepted(contact) => {
                debug!(
                    "Below threshold: {:?} ({:.2})",
                    contact.fio, contact.confidence_score
                );
                stats.rejected_low_confidence += 1;
            }
            Assembly::Rejected { .. } => stats.rejected_by_gate += 1,
        }
    }

    pub fn start_run(&self) -> RunAccumulator<'_> {
        RunAccumulator {
            pipeline: self,
            contacts: Vec::new(),
            stats: RunStats::default(),
        }
    }

    /// Process every message and return the deduplicated run.
    pub fn run<I>(&self, messages: I) -> RunReport
    where
        I: IntoIterator<Item = MailMessage>,
    {
        let mut run = self.start_run();
        for message in messages {
            run.process(&message);
        }
        run.finish()
    }
}

/// An in-progress run. Stopping early and calling [`finish`](Self::finish)
/// yields the contacts collected so far.
pub struct RunAccumulator<'a> {
    pipeline: &'a ContactPipeline,
    contacts: Vec<Contact>,
    stats: RunStats,
}

impl RunAccumulator<'_> {
    pub fn process(&mut self, message: &MailMessage) {
        self.stats.processed += 1;

        let external = self.pipeline.external_participants(message);
        if external.is_empty() {
            debug!("Message {}: internal only, skipped", message.id);
            self.stats.internal += 1;
            return;
        }
        self.stats.external += 1;

        let body = match message.body_text() {
            Ok(body) => body,
            Err(e @ ExtractionError::MissingBody(_)) => {
                warn!("{}", e);
                self.stats.missing_body += 1;
                return;
            }
            Err(e) => {
                debug!("{}", e);
                return;
            }
        };

        let contacts = self.pipeline.extract_counted(
            body,
            &message.subject,
            &message.date,
            &external,
            &mut self.stats,
        );
        debug!("Message {}: {} contacts", message.id, contacts.len());
        self.contacts.extend(contacts);
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Deduplicate across the run and return the result.
    pub fn finish(self) -> RunReport {
        let mut stats = self.stats;
        let (contacts, removed) = dedupe(self.contacts);
        stats.duplicates_removed += removed;
        stats.unique_contacts = contacts.len();

        info!(
            "Run finished: {} messages ({} external, {} internal), {} contacts, {} duplicates removed",
            stats.processed,
            stats.external,
            stats.internal,
            stats.unique_contacts,
            stats.duplicates_removed
        );

        RunReport { contacts, stats }
    }
}

/// The first `max` characters of `text`.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
