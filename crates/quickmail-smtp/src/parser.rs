//! SMTP reply parser.

use crate::error::{Error, Result};
use crate::types::{Reply, ReplyCode};

/// Parses an SMTP reply from its response lines (without CRLF).
///
/// Replies are single-line (`250 OK`) or multi-line, where every line but the
/// last uses `-` after the code: `250-smtp.gmail.com`, `250 SMTPUTF8`.
///
/// # Errors
///
/// Returns an error if the reply is empty, a line is malformed, or the lines
/// disagree on the reply code.
pub fn parse_reply(lines: &[String]) -> Result<Reply> {
    let first = lines
        .first()
        .ok_or_else(|| Error::Protocol("Empty reply".into()))?;
    let code = parse_code(first)?;

    let mut message = Vec::with_capacity(lines.len());
    for line in lines {
        if parse_code(line)? != code {
            return Err(Error::Protocol(format!(
                "Reply code changed mid-reply: {line}"
            )));
        }
        let text = if line.len() == 3 { Some("") } else { line.get(4..) };
        let text = text.ok_or_else(|| Error::Protocol(format!("Malformed reply line: {line}")))?;
        message.push(text.to_string());
    }

    Ok(Reply::new(ReplyCode::new(code), message))
}

fn parse_code(line: &str) -> Result<u16> {
    let digits = line
        .get(0..3)
        .ok_or_else(|| Error::Protocol(format!("Reply too short: {line}")))?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::Protocol(format!("Invalid reply code: {digits}")));
    }
    digits
        .parse()
        .map_err(|_| Error::Protocol(format!("Invalid reply code: {digits}")))
}

/// Checks if a line ends a reply.
///
/// Continuation lines carry `-` after the code; the final line carries a
/// space or nothing at all.
#[must_use]
pub fn is_last_reply_line(line: &str) -> bool {
    match line.as_bytes().get(3) {
        None => line.len() == 3,
        Some(b) => *b == b' ',
    }
}
