//! Envelope address type.

use crate::error::{Error, Result};

/// Bare email address as used in `MAIL FROM` and `RCPT TO`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Creates an address after basic validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is empty, lacks exactly one `@` with
    /// non-empty sides, or contains characters that would break the envelope
    /// command line (whitespace, angle brackets, control characters).
    pub fn new(addr: impl Into<String>) -> Result<Self> {
        let addr = addr.into();
        Self::validate(&addr)?;
        Ok(Self(addr))
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(addr: &str) -> Result<()> {
        if addr.is_empty() {
            return Err(Error::InvalidAddress("Address cannot be empty".into()));
        }

        if addr
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == '<' || c == '>')
        {
            return Err(Error::InvalidAddress(format!(
                "Address contains invalid characters: {addr:?}"
            )));
        }

        match addr.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
                if domain.contains('@') {
                    Err(Error::InvalidAddress(
                        "Address must have exactly one @".into(),
                    ))
                } else {
                    Ok(())
                }
            }
            Some(_) => Err(Error::InvalidAddress(
                "Local and domain parts cannot be empty".into(),
            )),
            None => Err(Error::InvalidAddress("Address must contain @".into())),
        }
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn valid_address() {
        let addr = Address::new("a@gmail.com").unwrap();
        assert_eq!(addr.as_str(), "a@gmail.com");
        assert_eq!(addr.to_string(), "a@gmail.com");
    }

    #[test]
    fn rejects_malformed() {
        assert!(Address::new("").is_err());
        assert!(Address::new("userexample.com").is_err());
        assert!(Address::new("@example.com").is_err());
        assert!(Address::new("user@").is_err());
        assert!(Address::new("a@b@c").is_err());
    }

    #[test]
    fn rejects_command_injection() {
        assert!(Address::new("a@b.com>\r\nRCPT TO:<c@d.com").is_err());
        assert!(Address::new("a b@c.com").is_err());
    }
}
