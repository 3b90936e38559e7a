//! Reversible encoding for the stored password.
//!
//! Standard base64 over the raw bytes. Not encryption.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::Secret;
use crate::Result;

/// Encodes raw bytes for storage.
#[must_use]
pub fn encode(raw: &[u8]) -> String {
    STANDARD.encode(raw)
}

/// Decodes bytes previously produced by [`encode`].
///
/// # Errors
///
/// Returns an error if `encoded` is not valid padded base64.
pub fn decode(encoded: &str) -> Result<Vec<u8>> {
    Ok(STANDARD.decode(encoded.trim())?)
}

/// Encodes a secret for storage.
#[must_use]
pub fn encode_secret(secret: &Secret) -> String {
    encode(secret.expose().as_bytes())
}

/// Decodes a stored secret.
///
/// # Errors
///
/// Returns an error if the value is not valid base64 or not UTF-8.
pub fn decode_secret(encoded: &str) -> Result<Secret> {
    let raw = decode(encoded)?;
    Ok(Secret::new(String::from_utf8(raw)?))
}
