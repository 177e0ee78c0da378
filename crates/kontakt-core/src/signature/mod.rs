//! Signature location: finding the contact-bearing blocks of a message.

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, trace};

use crate::contact::rules::extract_emails;
use crate::lexicon::Lexicon;
use crate::models::config::SignatureConfig;
use crate::models::message::MessageKind;

lazy_static! {
    // Mail client headers, dropped from signature blocks
    static ref HEADER_LINE: Regex = Regex::new(
        r"(?i)^\s*(?:от кого|от|отправлено|кому|тема|копия|subject|from|sent|to|cc|date)\s*:"
    ).unwrap();

    // Headers that only open quoted history; "Тема:" or "To:" may be the
    // sender's own text
    static ref QUOTE_HEADER: Regex = Regex::new(
        r"(?i)^\s*(?:от кого|отправлено|from|sent)\s*:"
    ).unwrap();

    static ref CHAIN_MARKER: Regex = Regex::new(
        r"(?i)(?:\bwrote:|написал(?:\(а\)|а)?:|\bпишет:|-{2,}\s*original message\s*-{2,}|-{2,}\s*исходное сообщение\s*-{2,}|-{2,}\s*forwarded message\s*-{2,}|-{2,}\s*пересылаемое сообщение\s*-{2,})"
    ).unwrap();

    // "19:00, 18 июня 2025"
    static ref TIMESTAMP_LINE: Regex = Regex::new(
        r"^\s*\d{1,2}:\d{2},\s*\d{1,2}\s+[а-яё]+\s+\d{4}"
    ).unwrap();

    static ref DATE_LINES: Vec<Regex> = vec![
        Regex::new(r"^\s*\d{4}-\d{2}-\d{2}").unwrap(),
        Regex::new(r"(?i)^\s*on \d{1,2}/").unwrap(),
        Regex::new(r"(?i)^\s*в \d{1,2}:\d{2}").unwrap(),
        Regex::new(r"(?i)^\s*\d{2}\.\d{2}\.\d{4}.*пишет").unwrap(),
    ];

    static ref FORWARD_SUBJECT: Regex = Regex::new(r"(?i)^\s*(?:fwd?|пересл|переслано)\s*:").unwrap();
    static ref REPLY_SUBJECT: Regex = Regex::new(r"(?i)^\s*(?:re|ответ|отв)\s*(?:\[\d+\])?\s*:").unwrap();
}

/// Lines scanned for email addresses when a body has no signature marker.
const SIGNATURE_EMAIL_TAIL_LINES: usize = 8;

/// Whether a line opens quoted history: a sender header of the quoted
/// message or a reply/forward marker.
pub fn is_chain_header(line: &str) -> bool {
    QUOTE_HEADER.is_match(line) || CHAIN_MARKER.is_match(line)
}

/// Classify a message by subject prefix, then by body markers.
pub fn classify_message(subject: &str, body: &str) -> MessageKind {
    if FORWARD_SUBJECT.is_match(subject) {
        MessageKind::Forwarded
    } else if REPLY_SUBJECT.is_match(subject) {
        MessageKind::Reply
    } else if body.lines().any(is_chain_header) {
        MessageKind::Chain
    } else {
        MessageKind::Original
    }
}

/// The part of the body written by the sender of this message.
///
/// Replies and chains are cut at the first chain header, since quoted
/// history belongs to earlier messages. Forwards are kept whole: the
/// forwarded content is the payload.
pub fn own_text(kind: MessageKind, body: &str) -> &str {
    match kind {
        MessageKind::Reply | MessageKind::Chain => {
            let mut offset = 0;
            for line in body.split_inclusive('\n') {
                if is_chain_header(line) {
                    return &body[..offset];
                }
                offset += line.len();
            }
            body
        }
        MessageKind::Original | MessageKind::Forwarded => body,
    }
}

/// Locates signature blocks in plain-text bodies.
pub struct SignatureLocator {
    lexicon: Arc<Lexicon>,
    config: SignatureConfig,
}

impl SignatureLocator {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self {
            lexicon,
            config: SignatureConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SignatureConfig) -> Self {
        self.config = config;
        self
    }

    /// Candidate blocks in body order.
    ///
    /// Each short line carrying a closing salutation or separator opens a
    /// window of the following lines, cut at the first chain header. Without
    /// any marker the tail of the body is used.
    pub fn locate(&self, body: &str) -> Vec<String> {
        let lines: Vec<&str> = body.lines().collect();
        let mut blocks = Vec::new();
        let mut covered_until = 0;

        for (i, line) in lines.iter().enumerate() {
            if i < covered_until || !self.is_marker_line(line) {
                continue;
            }

            let limit = (i + 1 + self.config.window_lines).min(lines.len());
            let end = (i + 1..limit)
                .find(|&j| is_chain_header(lines[j]))
                .unwrap_or(limit);
            covered_until = end;

            let block = self.filter_lines(&lines[i..end]);
            trace!("Marker at line {}: window {}..{}", i, i, end);
            if block.chars().count() > self.config.min_block_chars {
                blocks.push(block);
            }
        }

        if blocks.is_empty() && !lines.iter().any(|l| self.is_marker_line(l)) {
            let start = lines.len().saturating_sub(self.config.fallback_lines);
            let block = self.filter_lines(&lines[start..]);
            if block.chars().count() > self.config.min_fallback_chars {
                debug!("No signature marker, using the last {} lines", lines.len() - start);
                blocks.push(block);
            }
        }

        debug!("Located {} signature blocks", blocks.len());
        blocks
    }

    /// The whole body without headers, timestamps, quotes and internal
    /// markers, or `None` if too little is left.
    pub fn deep_clean_body(&self, body: &str) -> Option<String> {
        let cleaned = body
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter(|line| !self.is_noise_line(line))
            .filter(|line| !DATE_LINES.iter().any(|re| re.is_match(line)))
            .collect::<Vec<_>>()
            .join("\n");

        if cleaned.chars().count() > self.config.min_body_chars {
            Some(cleaned)
        } else {
            None
        }
    }

    /// Email addresses appearing in signature regions: after each marker up
    /// to the next chain header, or in the last lines without a marker.
    pub fn signature_emails(&self, body: &str) -> Vec<String> {
        let lines: Vec<&str> = body.lines().collect();
        let mut region: Vec<&str> = Vec::new();
        let mut inside = false;

        for line in &lines {
            if is_chain_header(line) {
                inside = false;
                continue;
            }
            if self.is_marker_line(line) {
                inside = true;
            }
            if inside {
                region.push(line);
            }
        }

        if region.is_empty() && !lines.iter().any(|l| self.is_marker_line(l)) {
            region = lines
                .iter()
                .rev()
                .filter(|l| !l.trim().is_empty() && !is_chain_header(l))
                .take(SIGNATURE_EMAIL_TAIL_LINES)
                .copied()
                .collect();
            region.reverse();
        }

        extract_emails(&region.join("\n"))
    }

    fn is_marker_line(&self, line: &str) -> bool {
        let trimmed = line.trim();
        if trimmed.is_empty()
            || trimmed.chars().count() >= self.config.max_marker_line_chars
            || is_chain_header(trimmed)
        {
            return false;
        }
        let lower = trimmed.to_lowercase();
        self.lexicon
            .signature_markers()
            .iter()
            .any(|m| lower.contains(m.as_str()))
    }

    fn is_noise_line(&self, line: &str) -> bool {
        let trimmed = line.trim();
        trimmed.starts_with('>')
            || HEADER_LINE.is_match(trimmed)
            || CHAIN_MARKER.is_match(trimmed)
            || TIMESTAMP_LINE.is_match(trimmed)
            || self.lexicon.contains_internal_marker(trimmed)
            || self.lexicon.is_blacklisted_company(trimmed)
    }

    fn filter_lines(&self, lines: &[&str]) -> String {
        lines
            .iter()
            .filter(|line| !self.is_noise_line(line))
            .map(|line| line.trim_end())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn locator() -> SignatureLocator {
        SignatureLocator::new(Arc::new(Lexicon::embedded()))
    }

    #[test]
    fn test_marker_window() {
        let body = "Добрый день!\nПросим выставить счёт.\n\nС уважением,\nИванов Иван Иванович\nМенеджер по закупкам\nТел. 8 (383) 212-34-56";
        assert_eq!(
            locator().locate(body),
            vec!["С уважением,\nИванов Иван Иванович\nМенеджер по закупкам\nТел. 8 (383) 212-34-56".to_string()]
        );
    }

    #[test]
    fn test_window_stops_at_chain_header() {
        let body = "Спасибо!\nС уважением, Петров Пётр\n+7 (916) 123-45-67\n\nFrom: sales@dna-technology.ru\nSent: Monday\nС уважением,\nМария Гоголева";
        let blocks = locator().locate(body);
        assert_eq!(blocks, vec!["С уважением, Петров Пётр\n+7 (916) 123-45-67".to_string()]);
    }

    #[test]
    fn test_long_lines_are_not_markers() {
        let long = format!("С уважением относимся к {} вашей заявке.", "очень ".repeat(15));
        let body = format!("{}\nИванов Иван\nтел. 8 (383) 212-34-56", long);
        // falls back to the tail
        let blocks = locator().locate(&body);
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].starts_with("С уважением относимся"));
    }

    #[test]
    fn test_internal_lines_filtered() {
        let body = "С уважением,\nСветлана Воронова\nTelegram: @dna_tech_rus\nВаршавское шоссе, дом 125Ж, корпус 5";
        // nothing long enough survives filtering
        assert!(locator().locate(body).is_empty());
    }

    #[test]
    fn test_fallback_requires_length() {
        assert!(locator().locate("Ок").is_empty());
        assert_eq!(
            locator().locate("Иванов Иван\nООО «Вектор», тел. 8 (383) 212-34-56"),
            vec!["Иванов Иван\nООО «Вектор», тел. 8 (383) 212-34-56".to_string()]
        );
    }

    #[test]
    fn test_classify_message() {
        assert_eq!(classify_message("Fwd: счёт", ""), MessageKind::Forwarded);
        assert_eq!(classify_message("RE: КП", ""), MessageKind::Reply);
        assert_eq!(classify_message("Ответ: КП", ""), MessageKind::Reply);
        assert_eq!(
            classify_message("КП", "Спасибо\n\n12.03.2025 10:00, Иван пишет:\n> текст"),
            MessageKind::Chain
        );
        assert_eq!(classify_message("КП", "Добрый день"), MessageKind::Original);
    }

    #[test]
    fn test_topic_line_is_not_a_chain() {
        let body = "Добрый день!\nТема: поставка реагентов\nTo: отдел закупок\n\nС уважением,\nИванов Иван Иванович\nТел. 8 (383) 212-34-56";
        assert_eq!(classify_message("КП", body), MessageKind::Original);
        assert_eq!(own_text(MessageKind::Reply, body), body);
        assert!(!is_chain_header("Тема: поставка реагентов"));
        assert!(is_chain_header("От кого: Иванов Иван"));
        assert!(is_chain_header("Sent: Monday, July 28, 2025"));
    }

    #[test]
    fn test_own_text_cuts_replies_only() {
        let body = "Ответ\nС уважением, Иван\n-----Original Message-----\nFrom: x@y.ru\nстарый текст";
        assert_eq!(own_text(MessageKind::Reply, body), "Ответ\nС уважением, Иван\n");
        assert_eq!(own_text(MessageKind::Forwarded, body), body);
    }

    #[test]
    fn test_deep_clean_body() {
        let body = "From: a@b.ru\n\n19:00, 18 июня 2025\nИванов Иван, ООО «Вектор»\nТел. 8 (383) 212-34-56\n> quoted";
        assert_eq!(
            locator().deep_clean_body(body),
            Some("Иванов Иван, ООО «Вектор»\nТел. 8 (383) 212-34-56".to_string())
        );
        assert_eq!(locator().deep_clean_body("From: a@b.ru\nОк"), None);
    }

    #[test]
    fn test_signature_emails() {
        let body = "Пишите: old@example.ru\nС уважением,\nИван\nivan@client.ru\nFrom: other@client.ru";
        assert_eq!(locator().signature_emails(body), vec!["ivan@client.ru".to_string()]);

        let body = "Текст письма\nИван\nivan@client.ru";
        assert_eq!(locator().signature_emails(body), vec!["ivan@client.ru".to_string()]);
    }
}
