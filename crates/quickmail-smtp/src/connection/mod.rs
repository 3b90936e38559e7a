//! SMTP session management with the type-state pattern.

mod client;
mod stream;

pub use client::{Authenticated, Client, Data, Envelope, Greeted, Recipients};
pub use stream::{SmtpStream, connect, connect_tls};

use crate::types::{AuthMechanism, Extension};
use std::collections::HashSet;

/// Server capabilities from the greeting and EHLO reply.
#[derive(Debug, Clone, Default)]
pub struct ServerInfo {
    /// Server hostname from the greeting.
    pub hostname: String,
    /// Advertised extensions.
    pub extensions: HashSet<Extension>,
}

impl ServerInfo {
    /// Replaces the extension set with the lines of an EHLO reply.
    ///
    /// The first line is the server's greeting and is skipped.
    pub fn update_from_ehlo(&mut self, lines: &[String]) {
        self.extensions = lines.iter().skip(1).map(|l| Extension::parse(l)).collect();
    }

    /// Checks if the server supports an extension.
    #[must_use]
    pub fn supports(&self, ext: &Extension) -> bool {
        self.extensions.contains(ext)
    }

    /// Checks if STARTTLS is advertised.
    #[must_use]
    pub fn supports_starttls(&self) -> bool {
        self.supports(&Extension::StartTls)
    }

    /// Checks if 8BITMIME is advertised.
    #[must_use]
    pub fn supports_8bitmime(&self) -> bool {
        self.supports(&Extension::EightBitMime)
    }

    /// Returns the maximum message size, if advertised.
    #[must_use]
    pub fn max_message_size(&self) -> Option<usize> {
        self.extensions.iter().find_map(|ext| match ext {
            Extension::Size(size) => *size,
            _ => None,
        })
    }

    /// Returns the advertised authentication mechanisms we support.
    #[must_use]
    pub fn auth_mechanisms(&self) -> Vec<AuthMechanism> {
        self.extensions
            .iter()
            .find_map(|ext| match ext {
                Extension::Auth(mechanisms) => Some(mechanisms.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gmail_after_starttls() -> ServerInfo {
        let mut info = ServerInfo::default();
        let lines: Vec<String> = [
            "smtp.gmail.com at your service",
            "SIZE 35882577",
            "8BITMIME",
            "AUTH LOGIN PLAIN XOAUTH2",
            "SMTPUTF8",
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        info.update_from_ehlo(&lines);
        info
    }

    #[test]
    fn capabilities_from_ehlo() {
        let info = gmail_after_starttls();
        assert!(!info.supports_starttls());
        assert!(info.supports_8bitmime());
        assert_eq!(info.max_message_size(), Some(35_882_577));
        assert_eq!(
            info.auth_mechanisms(),
            vec![AuthMechanism::Login, AuthMechanism::Plain]
        );
    }

    #[test]
    fn empty_server_info() {
        let info = ServerInfo::default();
        assert_eq!(info.max_message_size(), None);
        assert!(info.auth_mechanisms().is_empty());
    }
}
