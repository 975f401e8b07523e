//! # retry-queue - Single-flight refresh and retry
//!
//! When many requests fail for the same reason at once (typically an expired
//! access token), only one refresh should run and every failed request should
//! be replayed with its result.
#![deny(unsafe_code)]

//! ## Features
//!
//! - **Single-flight refresh**: concurrent failures share one refresh cycle.
//! - **Waiter queue**: requests failing mid-refresh wait and are resumed in arrival order.
//! - **Loop guard**: a request is retried at most once per retry reason.
//! - **Pluggable strategies**: the failure policy, the refresh action and the replay
//!   are supplied through the [`RetryStrategy`](retry::RetryStrategy) trait.
//! - **HTTP binding** (`http` feature): bearer-token refresh on top of `reqwest`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use retry_queue::prelude::*;
//!
//! # async fn example() -> Result<(), RetryError> {
//! let client = RetryingClient::new(
//!     reqwest::Client::new(),
//!     Arc::new(StaticTokenProvider::new("token")),
//!     BearerRetryConfig::default(),
//! )?;
//!
//! let response = client
//!     .execute(HttpRequestDescriptor::get("https://api.example.com/v1/me"))
//!     .await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! The crate emits `tracing` events under the `retry_queue::coordinator` and
//! `retry_queue::http` targets and never installs a subscriber itself.

pub mod auth;
pub mod error;
#[cfg(feature = "http")]
pub mod http;
pub mod retry;

pub use error::{QueueError, RetryError};
pub use retry::{RequestFailure, RetryCoordinator, RetryMarker, RetryStrategy};

/// Commonly used types.
pub mod prelude {
    pub use crate::auth::{StaticTokenProvider, TokenProvider};
    pub use crate::error::{ErrorCategory, QueueError, RetryError};
    #[cfg(feature = "http")]
    pub use crate::http::{
        BearerRefreshStrategy, BearerRetryConfig, HttpRequestDescriptor, HttpResponse,
        RetryingClient,
    };
    pub use crate::retry::{
        QueueSnapshot, RequestFailure, RetryCoordinator, RetryMarker, RetryMarks,
        RetryStrategy, RetryStrategyExt, WithRefreshTimeout,
    };
}
