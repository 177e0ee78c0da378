//! Error types for the kontakt-core library.

use thiserror::Error;

/// Main error type for the kontakt library.
#[derive(Error, Debug)]
pub enum KontaktError {
    /// Resource (lexicon) loading error.
    #[error("lexicon error: {0}")]
    Lexicon(#[from] LexiconError),

    /// Contact extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while reading line-delimited resource files.
///
/// Pattern errors are never fatal to a load: the offending line is skipped
/// and the error is kept in [`crate::Lexicon::warnings`].
#[derive(Error, Debug)]
pub enum LexiconError {
    /// A configured regex failed to compile.
    #[error("{file}:{line}: invalid pattern: {source}")]
    PatternCompile {
        file: String,
        line: usize,
        #[source]
        source: regex::Error,
    },

    /// A phone template names a class other than mobile/landline/compound.
    #[error("{file}:{line}: unknown template class '{class}'")]
    UnknownTemplateClass {
        file: String,
        line: usize,
        class: String,
    },

    /// A resource file exists but could not be read.
    #[error("failed to read {file}: {source}")]
    Read {
        file: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to contact field extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The input text was empty or unusable.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The message has no body to scan.
    #[error("message {0} has no body")]
    MissingBody(String),
}

/// Result type for the kontakt library.
pub type Result<T> = std::result::Result<T, KontaktError>;
