//! Retrying HTTP client.
//!
//! Sends requests with the provider's current token and hands every failure to
//! a shared [`RetryCoordinator`], which decides whether to refresh the token
//! and replay the request or to return the error as is.

use std::sync::Arc;

use secrecy::ExposeSecret;

use super::bearer::BearerRefreshStrategy;
use super::config::BearerRetryConfig;
use super::request::{HttpFailure, HttpRequestDescriptor, HttpResponse, send_with_token};
use crate::auth::TokenProvider;
use crate::error::RetryError;
use crate::retry::RetryCoordinator;

/// HTTP client whose token-related failures are coordinated.
///
/// Clones share the coordinator, so concurrent failures across clones still
/// trigger a single token refresh.
pub struct RetryingClient<P: TokenProvider + 'static> {
    coordinator: Arc<RetryCoordinator<BearerRefreshStrategy<P>>>,
}

impl<P: TokenProvider + 'static> Clone for RetryingClient<P> {
    fn clone(&self) -> Self {
        Self {
            coordinator: self.coordinator.clone(),
        }
    }
}

impl<P: TokenProvider + 'static> RetryingClient<P> {
    /// Create a client with its own coordinator.
    pub fn new(
        http_client: reqwest::Client,
        provider: Arc<P>,
        config: BearerRetryConfig,
    ) -> Result<Self, RetryError> {
        let strategy = BearerRefreshStrategy::new(http_client, provider, config)?;
        Ok(Self::with_coordinator(Arc::new(RetryCoordinator::new(strategy))))
    }

    /// Create a client on top of an existing (possibly shared) coordinator.
    pub fn with_coordinator(
        coordinator: Arc<RetryCoordinator<BearerRefreshStrategy<P>>>,
    ) -> Self {
        Self { coordinator }
    }

    pub fn coordinator(&self) -> &Arc<RetryCoordinator<BearerRefreshStrategy<P>>> {
        &self.coordinator
    }

    /// Send `request`; on failure let the coordinator refresh and replay it.
    pub async fn execute(
        &self,
        request: HttpRequestDescriptor,
    ) -> Result<HttpResponse, RetryError> {
        let strategy = self.coordinator.strategy();
        let token = strategy.provider().token().await?;

        match send_with_token(
            strategy.http_client(),
            &request,
            strategy.header(),
            token.expose_secret(),
        )
        .await
        {
            Ok(response) => Ok(response),
            Err(error) => {
                self.coordinator
                    .on_failure(HttpFailure::new(request, error))
                    .await
            }
        }
    }

    /// Send `request` and decode the JSON body.
    pub async fn execute_json<T: serde::de::DeserializeOwned>(
        &self,
        request: HttpRequestDescriptor,
    ) -> Result<T, RetryError> {
        self.execute(request).await?.json()
    }
}
