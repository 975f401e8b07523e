//! Error Handling Module
//!
//! This module provides the error types used across the crate:
//! - `QueueError`: failures produced by the retry coordinator itself
//! - `RetryError`: the crate-level error used by the HTTP binding and auth layer
//! - Type conversions from common error types
//!
//! # Example
//!
//! ```rust,ignore
//! use retry_queue::error::{ErrorCategory, RetryError};
//!
//! let error = RetryError::api_error(401, "token expired");
//! assert_eq!(error.category(), ErrorCategory::Authentication);
//! assert!(error.is_auth_error());
//! ```

// Module declarations
mod conversions;
pub mod helpers;
pub mod types;

// Re-exports for public API
pub use helpers::*;
pub use types::*;
