//! HTTP binding
//!
//! Bearer-token refresh on top of `reqwest`:
//! - `config`: retry configuration (tag, statuses, refresh deadline, header)
//! - `request`: replayable request descriptors and buffered responses
//! - `bearer`: the `RetryStrategy` that refreshes tokens and replays requests
//! - `client`: a client that routes failed requests through a shared coordinator

pub mod bearer;
pub mod client;
pub mod config;
pub mod request;

pub use bearer::BearerRefreshStrategy;
pub use client::RetryingClient;
pub use config::BearerRetryConfig;
pub use request::{HttpFailure, HttpRequestDescriptor, HttpResponse};
