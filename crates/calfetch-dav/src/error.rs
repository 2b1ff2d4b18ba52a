//! Error types for CalDAV operations.
//!
//! Every failure path of the client ends up as a [`DavError`] carrying a
//! [`DavErrorCode`], so callers can tell an empty calendar apart from a
//! request that never completed.

use std::fmt;
use thiserror::Error;

/// The category of a CalDAV error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DavErrorCode {
    /// The calendar URL does not have the `scheme://host[:port][/path]` shape.
    InvalidUrl,
    /// Transport failure: connection refused, TLS handshake, timeout, etc.
    Network,
    /// The response body is not a well-formed multistatus document.
    ResponseParse,
    /// Server rejected the credentials (401).
    AuthenticationFailed,
    /// Server denied access (403).
    AuthorizationFailed,
    /// Collection not found (404).
    NotFound,
    /// Server returned a 5xx status.
    Server,
    /// Server returned a status the client does not handle.
    UnexpectedStatus,
    /// Internal error, e.g. request body serialization.
    Internal,
}

impl DavErrorCode {
    /// Returns true if this error is transient and the operation may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network | Self::Server)
    }

    /// Returns a stable machine-readable name for this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidUrl => "invalid_url",
            Self::Network => "network_error",
            Self::ResponseParse => "response_parse_error",
            Self::AuthenticationFailed => "authentication_failed",
            Self::AuthorizationFailed => "authorization_failed",
            Self::NotFound => "not_found",
            Self::Server => "server_error",
            Self::UnexpectedStatus => "unexpected_status",
            Self::Internal => "internal_error",
        }
    }
}

impl fmt::Display for DavErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while talking to a CalDAV server.
#[derive(Debug, Error)]
pub struct DavError {
    code: DavErrorCode,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl DavError {
    /// Creates a new error with the given code and message.
    pub fn new(code: DavErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::new(DavErrorCode::InvalidUrl, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(DavErrorCode::Network, message)
    }

    /// Creates a response parse error.
    pub fn response_parse(message: impl Into<String>) -> Self {
        Self::new(DavErrorCode::ResponseParse, message)
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(DavErrorCode::AuthenticationFailed, message)
    }

    /// Creates an authorization error.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(DavErrorCode::AuthorizationFailed, message)
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(DavErrorCode::NotFound, message)
    }

    /// Creates a server error.
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(DavErrorCode::Server, message)
    }

    /// Creates an unexpected status error.
    pub fn unexpected_status(message: impl Into<String>) -> Self {
        Self::new(DavErrorCode::UnexpectedStatus, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(DavErrorCode::Internal, message)
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> DavErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns true if this error is transient and may be retried.
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for DavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for CalDAV operations.
pub type DavResult<T> = Result<T, DavError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_retryable() {
        assert!(DavErrorCode::Network.is_retryable());
        assert!(DavErrorCode::Server.is_retryable());
        assert!(!DavErrorCode::InvalidUrl.is_retryable());
        assert!(!DavErrorCode::ResponseParse.is_retryable());
        assert!(!DavErrorCode::AuthenticationFailed.is_retryable());
    }

    #[test]
    fn error_code_display() {
        assert_eq!(DavErrorCode::InvalidUrl.as_str(), "invalid_url");
        assert_eq!(
            DavErrorCode::ResponseParse.to_string(),
            "response_parse_error"
        );
    }

    #[test]
    fn dav_error_creation() {
        let err = DavError::invalid_url("missing scheme");
        assert_eq!(err.code(), DavErrorCode::InvalidUrl);
        assert_eq!(err.message(), "missing scheme");
        assert!(!err.is_retryable());
    }

    #[test]
    fn dav_error_display() {
        let err = DavError::network("connection refused");
        assert_eq!(err.to_string(), "network_error: connection refused");
    }

    #[test]
    fn dav_error_with_source() {
        use std::error::Error;
        let io_err = std::io::Error::other("reset by peer");
        let err = DavError::network("read failed").with_source(io_err);
        assert!(err.source().is_some());
    }
}
