//! Core library for contact extraction from email signatures.
//!
//! This crate provides:
//! - Signature block location in plain-text message bodies
//! - Named-entity extraction (names, titles, organizations, addresses)
//! - Russian phone number normalization with extensions and siblings
//! - Contact assembly, completeness scoring and deduplication
//! - Line-delimited, overridable resource lists (stop words, blacklists,
//!   phone templates)

pub mod contact;
pub mod error;
pub mod lexicon;
pub mod models;
pub mod ner;
pub mod pipeline;
pub mod signature;

pub use contact::{dedupe, Assembly, ContactAssembler, GateRejection, Provenance};
pub use contact::rules::{PhoneExtractor, PhoneNumber};
pub use error::{ExtractionError, KontaktError, LexiconError, Result};
pub use lexicon::Lexicon;
pub use models::config::KontaktConfig;
pub use models::contact::{Contact, RunStats};
pub use models::message::{MailMessage, MessageKind};
pub use ner::{Entities, EntityExtractor, EntityKind, EntitySpan, EntityTagger, HeuristicTagger};
pub use pipeline::{ContactPipeline, RunAccumulator, RunReport};
pub use signature::{classify_message, SignatureLocator};
