//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored secret is not valid base64.
    #[error("Stored password is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// Stored secret decodes to bytes that are not UTF-8.
    #[error("Stored password is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// The user's home directory could not be determined.
    #[error("Could not determine home directory")]
    NoHomeDirectory,
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
