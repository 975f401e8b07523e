//! Retry strategy capability set
//!
//! A `RetryStrategy` describes one retry reason: which failures it owns, how
//! to obtain updated values, and how to replay a request with them. The
//! coordinator owns a strategy and drives it; strategies never see the queue.

use async_trait::async_trait;

use super::marker::RetryMarker;
use crate::error::QueueError;

/// A failed request together with the error it produced.
#[derive(Debug, Clone)]
pub struct RequestFailure<R, E> {
    pub request: R,
    pub error: E,
}

impl<R, E> RequestFailure<R, E> {
    pub fn new(request: R, error: E) -> Self {
        Self { request, error }
    }

    pub fn into_parts(self) -> (R, E) {
        (self.request, self.error)
    }
}

/// Behaviour injected into a [`RetryCoordinator`](super::RetryCoordinator).
///
/// Notes:
/// - `Values` and `Error` are cloned once per queued waiter when a refresh
///   cycle settles.
/// - `Error: From<QueueError>` lets the coordinator reject waiters whose cycle
///   ended without an outcome.
#[async_trait]
pub trait RetryStrategy: Send + Sync {
    /// Updated values produced by one refresh (e.g. a new access token).
    type Values: Clone + Send + Sync + 'static;
    /// Descriptor of the failed request.
    type Request: RetryMarker + Send + 'static;
    /// Response of a successfully retried request.
    type Response: Send + 'static;
    /// Error shared by failures, refreshes and retries.
    type Error: From<QueueError> + Clone + Send + Sync + 'static;

    /// Stable identifier of this retry reason. Must not change over the
    /// lifetime of the strategy.
    fn tag(&self) -> &str;

    /// Whether `error` is the kind of failure this strategy handles.
    fn is_applicable(&self, error: &Self::Error) -> bool;

    /// Obtain updated values. Called at most once per refresh cycle.
    async fn request_refresh(&self) -> Result<Self::Values, Self::Error>;

    /// Rebuild `request` with `values` and perform the retried request.
    async fn apply_updated_values(
        &self,
        request: Self::Request,
        values: Self::Values,
    ) -> Result<Self::Response, Self::Error>;
}
