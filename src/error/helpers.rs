//! Constructors and classification helpers for `RetryError`.

use super::types::{ErrorCategory, QueueError, RetryError};

impl RetryError {
    /// Create an API error from a status code and message.
    pub fn api_error(code: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::AuthenticationError(message.into())
    }

    /// HTTP status code carried by this error, if any.
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::ApiError { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// True for 401/403 responses and credential failures.
    pub const fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationError(_) | Self::ApiError { code: 401 | 403, .. }
        )
    }

    /// True for failures that an ordinary retry could plausibly fix.
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::HttpError(_) | Self::TimeoutError(_) => true,
            Self::ApiError { code, .. } => *code == 429 || *code >= 500,
            Self::Queue(QueueError::RefreshTimedOut(_)) => true,
            _ => false,
        }
    }

    /// Classify the error.
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::HttpError(_) => ErrorCategory::Network,
            Self::AuthenticationError(_) => ErrorCategory::Authentication,
            Self::ApiError { code: 401 | 403, .. } => ErrorCategory::Authentication,
            Self::ApiError { code, .. } if *code >= 500 => ErrorCategory::Server,
            Self::ApiError { .. } => ErrorCategory::Client,
            Self::ParseError(_) => ErrorCategory::Parsing,
            Self::ConfigurationError(_) => ErrorCategory::Configuration,
            Self::TimeoutError(_) => ErrorCategory::Timeout,
            Self::Queue(_) => ErrorCategory::Queue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_auth_classification() {
        let unauthorized = RetryError::api_error(401, "expired");
        assert!(unauthorized.is_auth_error());
        assert_eq!(unauthorized.category(), ErrorCategory::Authentication);
        assert_eq!(unauthorized.status_code(), Some(401));
        assert!(!unauthorized.is_retryable());

        let not_found = RetryError::api_error(404, "missing");
        assert!(!not_found.is_auth_error());
        assert_eq!(not_found.category(), ErrorCategory::Client);
    }

    #[test]
    fn test_retryable_and_queue_errors() {
        assert!(RetryError::api_error(503, "unavailable").is_retryable());
        assert!(RetryError::HttpError("reset".into()).is_retryable());

        let placeholder = RetryError::from(QueueError::ProcessingFailed);
        assert_eq!(placeholder.category(), ErrorCategory::Queue);
        assert_eq!(placeholder.to_string(), "Queue processing failed");

        let timed_out = RetryError::from(QueueError::RefreshTimedOut(Duration::from_millis(5)));
        assert!(timed_out.is_retryable());
    }
}
