//! Error types for calendar API operations.
//!
//! The variants mirror the failure modes of the token lifecycle and the
//! remote service boundary. Auth errors are fatal: there is no automatic
//! fallback between the refresh and interactive acquisition paths.

use std::path::PathBuf;

use thiserror::Error;

/// A specialized Result type for calendar API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// An error from the token lifecycle, local validation, or the remote API.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid credentials or session configuration, fatal at construction.
    #[error("invalid auth configuration: {0}")]
    AuthConfig(String),

    /// Exchanging an authorization code for tokens failed.
    #[error("authorization code exchange failed: {0}")]
    AuthExchange(String),

    /// Refreshing an expired access token failed.
    #[error("token refresh failed: {0}")]
    AuthRefresh(String),

    /// The persisted token file exists but cannot be parsed.
    #[error("corrupt token file at {path}: {reason}")]
    CorruptToken {
        /// Path of the offending token file.
        path: PathBuf,
        /// Why deserialization failed.
        reason: String,
    },

    /// A caller-supplied start/end string could not be parsed as a date-time.
    /// Raised locally, before any network call.
    #[error("invalid time range: {0}")]
    InvalidTimeRange(String),

    /// The remote service rejected a request with a non-2xx response.
    #[error("remote API error ({status}): {message}")]
    RemoteApi {
        /// HTTP status code of the rejection.
        status: u16,
        /// Response body, surfaced unmodified.
        message: String,
    },

    /// A transport-level failure: connection, timeout, or truncated body.
    #[error("network error: {0}")]
    Network(String),

    /// Filesystem I/O around the token file failed.
    #[error("token storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Creates a remote API error from a status code and response body.
    pub fn remote_api(status: u16, message: impl Into<String>) -> Self {
        Self::RemoteApi {
            status,
            message: message.into(),
        }
    }

    /// Returns the HTTP status code for remote API errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteApi { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_api_display() {
        let err = Error::remote_api(404, "calendar not found");
        let display = format!("{}", err);
        assert!(display.contains("404"));
        assert!(display.contains("calendar not found"));
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn corrupt_token_display() {
        let err = Error::CorruptToken {
            path: PathBuf::from("/tmp/tokens.json"),
            reason: "expected value at line 1".to_string(),
        };
        let display = format!("{}", err);
        assert!(display.contains("/tmp/tokens.json"));
        assert!(display.contains("expected value"));
    }

    #[test]
    fn auth_errors_have_no_status() {
        assert_eq!(Error::AuthRefresh("expired".to_string()).status(), None);
        assert_eq!(Error::AuthExchange("denied".to_string()).status(), None);
    }
}
