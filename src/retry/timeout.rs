//! Refresh deadlines
//!
//! The coordinator never times out a refresh on its own. Strategies that need a
//! deadline either call [`bounded_refresh`] themselves or are wrapped in
//! [`WithRefreshTimeout`].

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use super::strategy::RetryStrategy;
use crate::error::QueueError;

/// Run `refresh`, failing with `QueueError::RefreshTimedOut` once `limit` elapses.
/// `None` means no deadline.
pub async fn bounded_refresh<T, E, F>(limit: Option<Duration>, refresh: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: From<QueueError>,
{
    let Some(limit) = limit else {
        return refresh.await;
    };
    match tokio::time::timeout(limit, refresh).await {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::warn!(target: "retry_queue::coordinator", timeout = ?limit, "refresh timed out");
            Err(QueueError::RefreshTimedOut(limit).into())
        }
    }
}

/// A strategy whose refresh is bounded by a deadline.
#[derive(Debug, Clone)]
pub struct WithRefreshTimeout<S> {
    inner: S,
    timeout: Duration,
}

impl<S> WithRefreshTimeout<S> {
    pub fn new(inner: S, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[async_trait]
impl<S: RetryStrategy> RetryStrategy for WithRefreshTimeout<S> {
    type Values = S::Values;
    type Request = S::Request;
    type Response = S::Response;
    type Error = S::Error;

    fn tag(&self) -> &str {
        self.inner.tag()
    }

    fn is_applicable(&self, error: &Self::Error) -> bool {
        self.inner.is_applicable(error)
    }

    async fn request_refresh(&self) -> Result<Self::Values, Self::Error> {
        bounded_refresh(Some(self.timeout), self.inner.request_refresh()).await
    }

    async fn apply_updated_values(
        &self,
        request: Self::Request,
        values: Self::Values,
    ) -> Result<Self::Response, Self::Error> {
        self.inner.apply_updated_values(request, values).await
    }
}

/// Combinators available on every strategy.
pub trait RetryStrategyExt: RetryStrategy + Sized {
    /// Bound every refresh of this strategy by `timeout`.
    fn with_refresh_timeout(self, timeout: Duration) -> WithRefreshTimeout<Self> {
        WithRefreshTimeout::new(self, timeout)
    }
}

impl<S: RetryStrategy> RetryStrategyExt for S {}
