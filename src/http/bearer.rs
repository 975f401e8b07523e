//! Bearer token refresh strategy.
//!
//! Treats configured statuses (401 by default) as "the token is stale",
//! refreshes it through a [`TokenProvider`] and replays the request with the
//! new token.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::HeaderName;
use secrecy::{ExposeSecret, SecretString};

use super::config::BearerRetryConfig;
use super::request::{HttpRequestDescriptor, HttpResponse, send_with_token};
use crate::auth::TokenProvider;
use crate::error::RetryError;
use crate::retry::RetryStrategy;
use crate::retry::timeout::bounded_refresh;

/// `RetryStrategy` refreshing bearer tokens for HTTP requests.
pub struct BearerRefreshStrategy<P: TokenProvider> {
    http_client: reqwest::Client,
    provider: Arc<P>,
    config: BearerRetryConfig,
    header: HeaderName,
}

impl<P: TokenProvider> BearerRefreshStrategy<P> {
    /// Create a strategy; fails if `config` does not validate.
    pub fn new(
        http_client: reqwest::Client,
        provider: Arc<P>,
        config: BearerRetryConfig,
    ) -> Result<Self, RetryError> {
        config.validate()?;
        let header = config.header()?;
        Ok(Self {
            http_client,
            provider,
            config,
            header,
        })
    }

    pub fn config(&self) -> &BearerRetryConfig {
        &self.config
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    pub(crate) fn header(&self) -> &HeaderName {
        &self.header
    }

    pub(crate) fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }
}

impl<P: TokenProvider> std::fmt::Debug for BearerRefreshStrategy<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerRefreshStrategy")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<P: TokenProvider + 'static> RetryStrategy for BearerRefreshStrategy<P> {
    type Values = SecretString;
    type Request = HttpRequestDescriptor;
    type Response = HttpResponse;
    type Error = RetryError;

    fn tag(&self) -> &str {
        &self.config.tag
    }

    fn is_applicable(&self, error: &RetryError) -> bool {
        error
            .status_code()
            .is_some_and(|status| self.config.is_retry_status(status))
    }

    async fn request_refresh(&self) -> Result<SecretString, RetryError> {
        tracing::debug!(target: "retry_queue::http", tag = %self.config.tag, "refreshing bearer token");
        bounded_refresh(self.config.refresh_timeout(), self.provider.refresh()).await
    }

    async fn apply_updated_values(
        &self,
        request: HttpRequestDescriptor,
        values: SecretString,
    ) -> Result<HttpResponse, RetryError> {
        tracing::debug!(target: "retry_queue::http", url = %request.url, "replaying request with refreshed token");
        send_with_token(
            &self.http_client,
            &request,
            &self.header,
            values.expose_secret(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenProvider;

    fn strategy(config: BearerRetryConfig) -> BearerRefreshStrategy<StaticTokenProvider> {
        BearerRefreshStrategy::new(
            reqwest::Client::new(),
            Arc::new(StaticTokenProvider::new("t")),
            config,
        )
        .unwrap()
    }

    #[test]
    fn test_applicability_follows_config() {
        let default = strategy(BearerRetryConfig::default());
        assert_eq!(default.tag(), "auth");
        assert!(default.is_applicable(&RetryError::api_error(401, "stale")));
        assert!(!default.is_applicable(&RetryError::api_error(403, "forbidden")));
        assert!(!default.is_applicable(&RetryError::HttpError("reset".into())));

        let custom = strategy(
            BearerRetryConfig::new()
                .with_tag("session")
                .with_retry_statuses([401, 419]),
        );
        assert_eq!(custom.tag(), "session");
        assert!(custom.is_applicable(&RetryError::api_error(419, "expired")));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = BearerRefreshStrategy::new(
            reqwest::Client::new(),
            Arc::new(StaticTokenProvider::new("t")),
            BearerRetryConfig::new().with_retry_statuses(Vec::new()),
        );
        assert!(matches!(result, Err(RetryError::ConfigurationError(_))));
    }
}
