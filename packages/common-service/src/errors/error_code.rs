//! Error codes emitted by this library.
//!
//! Codes are stable wire strings. Services may pass their own codes to the
//! responder; the ones below are reserved for this crate.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Missing, malformed or invalid credential
    Unauthorized,
    /// Request could not be understood
    BadRequest,
    /// Resource not found
    NotFound,
    /// Internal server error
    Internal,
}

impl ErrorCode {
    /// Returns the exact string that appears in HTTP responses.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "MX401",
            Self::BadRequest => "MX400",
            Self::NotFound => "MX404",
            Self::Internal => "MX500",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl AsRef<str> for ErrorCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
