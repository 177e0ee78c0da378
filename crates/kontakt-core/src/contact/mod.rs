//! Contact assembly, scoring and deduplication.

pub mod assembler;
pub mod dedup;
pub mod rules;
pub mod scoring;

pub use assembler::{Assembly, BlockFields, ContactAssembler, Provenance};
pub use dedup::dedupe;
pub use scoring::{gate, score, GateRejection};
