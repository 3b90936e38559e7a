//! Settings model types.

use serde::{Deserialize, Serialize};

/// Default submission host.
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// Default submission port (STARTTLS).
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Security/encryption mode for the SMTP connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Security {
    /// No encryption (not recommended).
    None,
    /// Implicit TLS (connect directly with TLS).
    Tls,
    /// STARTTLS upgrade after plaintext connect.
    #[default]
    StartTls,
}

impl Security {
    /// Get display name for the security mode.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::None => "None (insecure)",
            Self::Tls => "SSL/TLS",
            Self::StartTls => "STARTTLS",
        }
    }
}

/// SMTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpServer {
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Security mode.
    pub security: Security,
}

impl Default for SmtpServer {
    fn default() -> Self {
        Self {
            host: DEFAULT_SMTP_HOST.to_string(),
            port: DEFAULT_SMTP_PORT,
            security: Security::StartTls,
        }
    }
}

/// A password held in memory.
///
/// `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Secret(String);

impl Secret {
    /// Wraps a plaintext secret.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the plaintext.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns true if the secret is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(****)")
    }
}

/// Saved defaults, with the password already decoded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Settings {
    /// Sender address (also the SMTP login).
    pub sender_email: String,
    /// Default recipient address.
    pub recipient_email: String,
    /// App Password, if one was saved.
    pub sender_password: Option<Secret>,
    /// SMTP server to submit through.
    pub smtp: SmtpServer,
}

impl Settings {
    /// Returns true if nothing but server defaults is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sender_email.is_empty()
            && self.recipient_email.is_empty()
            && self.sender_password.is_none()
    }
}
