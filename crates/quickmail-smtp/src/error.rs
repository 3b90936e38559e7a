//! Error types for SMTP operations.

use std::io;

/// Result type alias for SMTP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// SMTP error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Server answered with a non-success reply.
    #[error("SMTP error {code}: {message}")]
    Rejected {
        /// Reply code (e.g., 535).
        code: u16,
        /// Reply text from the server.
        message: String,
    },

    /// Server sent something that is not a valid reply.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Server closed the connection mid-conversation.
    #[error("Connection closed by server")]
    ConnectionClosed,

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Message larger than the server's advertised SIZE.
    #[error("Message exceeds size limit: {size} > {limit} bytes")]
    MessageTooLarge {
        /// Encoded message size.
        size: usize,
        /// Limit advertised by the server.
        limit: usize,
    },

    /// Feature not advertised by the server.
    #[error("Server does not support {0}")]
    NotSupported(String),
}

impl Error {
    /// Creates a rejection error from a reply code and message.
    #[must_use]
    pub fn rejected(code: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            code,
            message: message.into(),
        }
    }

    /// Returns true if the server refused the credentials.
    ///
    /// Covers 535 (credentials invalid), 534 (mechanism too weak, which Gmail
    /// sends when an account password is used instead of an App Password) and
    /// 530 (authentication required).
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Rejected { code: 530 | 534 | 535, .. })
    }
}
