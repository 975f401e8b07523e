//! Core error types.

use std::time::Duration;

use thiserror::Error;

/// Errors raised by the retry coordinator itself.
///
/// Strategy error types embed these via `From<QueueError>` so that a waiter
/// can be rejected even when no refresh error value exists.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// The refresh cycle a waiter belonged to was torn down without an outcome.
    #[error("Queue processing failed")]
    ProcessingFailed,

    /// The refresh action did not settle within the configured timeout.
    #[error("Refresh timed out after {0:?}")]
    RefreshTimedOut(Duration),
}

/// Crate-level error used by the HTTP binding and token providers.
///
/// The type is `Clone` because a single refresh failure is delivered to every
/// request waiting on that refresh.
#[derive(Error, Debug, Clone)]
pub enum RetryError {
    /// Transport-level failure (connection refused, TLS, ...).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// The server answered with a non-success status.
    #[error("API error {code}: {message}")]
    ApiError {
        code: u16,
        message: String,
        details: Option<serde_json::Value>,
    },

    /// Obtaining or refreshing a credential failed.
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// A response body could not be decoded.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// An operation exceeded its deadline.
    #[error("Timeout error: {0}")]
    TimeoutError(String),

    /// Failure produced by the retry coordinator.
    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// Coarse classification of a `RetryError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Authentication,
    Client,
    Server,
    Parsing,
    Configuration,
    Timeout,
    Queue,
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RetryError>;
