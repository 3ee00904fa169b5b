//! Error types for calendar source operations.
//!
//! Every transport or provider failure surfaces as a single [`SourceError`]
//! carrying a code and a message; no partial results cross the fetch
//! boundary.

use std::fmt;
use thiserror::Error;

/// The category of a source error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceErrorCode {
    /// Credentials are invalid, expired, or rejected.
    AuthenticationFailed,
    /// The caller lacks permission for the calendar.
    AuthorizationFailed,
    /// Connection failure, timeout, DNS resolution, etc.
    NetworkError,
    /// Too many requests.
    RateLimited,
    /// The provider returned a 5xx.
    ServerError,
    /// The response did not parse or had an unexpected shape.
    InvalidResponse,
    /// The calendar or resource does not exist.
    NotFound,
    /// The provider rejected the request as malformed.
    BadRequest,
    /// Missing or invalid local configuration.
    ConfigurationError,
    /// Unexpected internal state.
    InternalError,
}

impl SourceErrorCode {
    /// Returns true if the operation may succeed when retried.
    ///
    /// Nothing in this system retries automatically; the flag is for
    /// operator-facing diagnostics.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError | Self::RateLimited | Self::ServerError
        )
    }

    /// A stable snake_case name for this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::AuthorizationFailed => "authorization_failed",
            Self::NetworkError => "network_error",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::NotFound => "not_found",
            Self::BadRequest => "bad_request",
            Self::ConfigurationError => "configuration_error",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for SourceErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A failure while fetching from a calendar source.
#[derive(Debug, Error)]
pub struct SourceError {
    code: SourceErrorCode,
    message: String,
    /// The source that produced the error (e.g. "google").
    source_name: Option<String>,
    #[source]
    cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl SourceError {
    /// Creates a new source error with the given code and message.
    pub fn new(code: SourceErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source_name: None,
            cause: None,
        }
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(SourceErrorCode::AuthenticationFailed, message)
    }

    /// Creates an authorization error.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(SourceErrorCode::AuthorizationFailed, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(SourceErrorCode::NetworkError, message)
    }

    /// Creates a rate limit error.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(SourceErrorCode::RateLimited, message)
    }

    /// Creates a server error.
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(SourceErrorCode::ServerError, message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(SourceErrorCode::InvalidResponse, message)
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(SourceErrorCode::NotFound, message)
    }

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(SourceErrorCode::BadRequest, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(SourceErrorCode::ConfigurationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(SourceErrorCode::InternalError, message)
    }

    /// Sets the source name on this error.
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    /// Sets the underlying cause.
    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> SourceErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the source name, if set.
    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    /// Returns true if the error is transient.
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref name) = self.source_name {
            write!(f, "[{}] ", name)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_codes() {
        assert!(SourceErrorCode::NetworkError.is_retryable());
        assert!(SourceErrorCode::RateLimited.is_retryable());
        assert!(SourceErrorCode::ServerError.is_retryable());
        assert!(!SourceErrorCode::AuthenticationFailed.is_retryable());
        assert!(!SourceErrorCode::BadRequest.is_retryable());
    }

    #[test]
    fn error_accessors() {
        let err = SourceError::authentication("token rejected");
        assert_eq!(err.code(), SourceErrorCode::AuthenticationFailed);
        assert_eq!(err.message(), "token rejected");
        assert!(err.source_name().is_none());
    }

    #[test]
    fn display_includes_source_name() {
        let err = SourceError::network("connection refused").with_source_name("google");
        let text = err.to_string();
        assert!(text.contains("[google]"));
        assert!(text.contains("network_error"));
        assert!(text.contains("connection refused"));
    }

    #[test]
    fn cause_is_chained() {
        use std::error::Error;
        let io_err = std::io::Error::other("boom");
        let err = SourceError::internal("wrapper").with_cause(io_err);
        assert!(err.source().is_some());
    }
}
