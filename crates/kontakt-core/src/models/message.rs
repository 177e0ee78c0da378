//! Decoded mail messages as supplied by the retrieval layer.

use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;

/// One already-decoded message.
///
/// MIME decoding and mailbox access happen upstream; a `None` body means
/// retrieval failed for this message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MailMessage {
    /// Opaque message identifier (UID, file name, ...).
    pub id: String,

    /// Subject line.
    pub subject: String,

    /// Formatted date, usually `%d.%m.%Y %H:%M`.
    pub date: String,

    /// Header addresses (From, To, Cc).
    pub participants: Vec<String>,

    /// Plain-text body.
    pub body: Option<String>,
}

impl MailMessage {
    /// The body, or why it cannot be scanned.
    pub fn body_text(&self) -> Result<&str, ExtractionError> {
        match self.body.as_deref() {
            None => Err(ExtractionError::MissingBody(self.id.clone())),
            Some(body) if body.trim().is_empty() => Err(ExtractionError::MalformedInput(format!(
                "message {} has an empty body",
                self.id
            ))),
            Some(body) => Ok(body),
        }
    }
}

/// How a message relates to earlier correspondence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// A fresh message.
    Original,
    /// A reply (`Re:`).
    Reply,
    /// A forward (`Fwd:`).
    Forwarded,
    /// A body carrying quoted history without a reply/forward subject.
    Chain,
}

impl Default for MessageKind {
    fn default() -> Self {
        Self::Original
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Original => "original",
            Self::Reply => "reply",
            Self::Forwarded => "forwarded",
            Self::Chain => "chain",
        };
        f.write_str(name)
    }
}
