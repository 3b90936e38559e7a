//! Plain-text message rendering.

use std::fmt::Write;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Longest raw chunk that fits one encoded word (75 chars) as base64.
const ENCODED_WORD_CHUNK: usize = 45;

/// An email message to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// Sender address.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain text body.
    pub body: String,
}

impl OutgoingMessage {
    /// Creates a new outgoing message.
    #[must_use]
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// Returns at most `max_chars` characters of the body, with `...` appended
    /// when it was cut.
    #[must_use]
    pub fn body_preview(&self, max_chars: usize) -> String {
        let mut chars = self.body.chars();
        let mut preview: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            preview.push_str("...");
        }
        preview
    }

    /// Builds the RFC 5322 message, dated now.
    #[must_use]
    pub fn to_rfc5322(&self) -> String {
        self.render(&chrono::Local::now().to_rfc2822())
    }

    /// Builds the RFC 5322 message with the given `Date` header value.
    #[must_use]
    pub fn render(&self, date: &str) -> String {
        let mut message = String::new();

        let _ = write!(message, "From: {}\r\n", single_line(&self.from));
        let _ = write!(message, "To: {}\r\n", single_line(&self.to));
        let _ = write!(message, "Subject: {}\r\n", encode_header(&self.subject));
        let _ = write!(message, "Date: {date}\r\n");
        message.push_str("MIME-Version: 1.0\r\n");
        message.push_str("Content-Type: text/plain; charset=utf-8\r\n");
        message.push_str("Content-Transfer-Encoding: 8bit\r\n");

        // Empty line between headers and body
        message.push_str("\r\n");
        message.push_str(&self.body);

        message
    }
}

/// Collapses line breaks so a value cannot inject extra headers.
fn single_line(value: &str) -> String {
    value
        .split(['\r', '\n'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Encodes a header value as RFC 2047 words when it is not plain ASCII.
fn encode_header(value: &str) -> String {
    let value = single_line(value);
    if value.is_ascii() {
        return value;
    }

    let mut words = Vec::new();
    let mut chunk = String::new();
    for ch in value.chars() {
        if chunk.len() + ch.len_utf8() > ENCODED_WORD_CHUNK {
            words.push(encoded_word(&chunk));
            chunk.clear();
        }
        chunk.push(ch);
    }
    if !chunk.is_empty() {
        words.push(encoded_word(&chunk));
    }

    // Folded: each continuation line starts with whitespace.
    words.join("\r\n ")
}

fn encoded_word(text: &str) -> String {
    format!("=?utf-8?B?{}?=", STANDARD.encode(text.as_bytes()))
}
