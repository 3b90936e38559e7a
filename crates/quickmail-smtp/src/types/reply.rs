//! SMTP reply types.

/// Reply from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Reply code (e.g., 250).
    pub code: ReplyCode,
    /// Reply text, one entry per line.
    pub message: Vec<String>,
}

impl Reply {
    /// Creates a new reply.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec is not const-compatible
    pub fn new(code: ReplyCode, message: Vec<String>) -> Self {
        Self { code, message }
    }

    /// Returns true if this is a success reply (2xx).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code.is_success()
    }

    /// Returns the full text as a single string.
    #[must_use]
    pub fn message_text(&self) -> String {
        self.message.join("\n")
    }

    /// Returns the text of the first line, or an empty string.
    #[must_use]
    pub fn first_line(&self) -> &str {
        self.message.first().map_or("", String::as_str)
    }

    /// Converts a reply into an error unless its code is `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Rejected`] carrying the reply code and text.
    pub fn expect_code(self, expected: ReplyCode) -> crate::Result<Self> {
        if self.code == expected {
            Ok(self)
        } else {
            Err(crate::Error::rejected(
                self.code.as_u16(),
                self.message_text(),
            ))
        }
    }

    /// Converts a non-2xx reply into an error.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Rejected`] carrying the reply code and text.
    pub fn expect_success(self) -> crate::Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(crate::Error::rejected(
                self.code.as_u16(),
                self.message_text(),
            ))
        }
    }
}

/// SMTP reply code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReplyCode(u16);

impl ReplyCode {
    /// Creates a new reply code.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Returns the numeric code.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Returns true if this is a success code (2xx).
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

}

impl std::fmt::Display for ReplyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Codes the client checks for
impl ReplyCode {
    /// 220 Service ready
    pub const SERVICE_READY: Self = Self(220);
    /// 221 Service closing transmission channel
    pub const CLOSING: Self = Self(221);
    /// 235 Authentication succeeded
    pub const AUTH_SUCCEEDED: Self = Self(235);
    /// 250 Requested mail action okay, completed
    pub const OK: Self = Self(250);
    /// 334 Continue with authentication
    pub const AUTH_CONTINUE: Self = Self(334);
    /// 354 Start mail input
    pub const START_DATA: Self = Self(354);
    /// 535 Authentication credentials invalid
    pub const AUTH_FAILED: Self = Self(535);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn code_classes() {
        assert!(ReplyCode::OK.is_success());
        assert!(ReplyCode::AUTH_SUCCEEDED.is_success());
        assert!(!ReplyCode::AUTH_CONTINUE.is_success());
        assert!(!ReplyCode::AUTH_FAILED.is_success());
        assert_eq!(ReplyCode::CLOSING.to_string(), "221");
    }

    #[test]
    fn expect_success_maps_rejection() {
        let reply = Reply::new(
            ReplyCode::AUTH_FAILED,
            vec!["5.7.8 Username and Password not accepted.".to_string()],
        );
        let err = reply.expect_success().unwrap_err();
        assert!(err.is_auth_failure());
        assert!(err.to_string().contains("535"));
    }

    #[test]
    fn expect_code_accepts_exact_match() {
        let reply = Reply::new(ReplyCode::START_DATA, vec!["Go ahead".to_string()]);
        assert_eq!(reply.first_line(), "Go ahead");
        assert!(reply.clone().expect_code(ReplyCode::START_DATA).is_ok());
        assert!(reply.expect_code(ReplyCode::OK).is_err());
    }
}
