//! Authentication helpers and token providers.
//! This module defines a minimal trait to supply and refresh Bearer tokens.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::RetryError;

/// An asynchronous Bearer token provider.
///
/// Notes:
/// - `token` is called before every request and should be cheap (cached).
/// - `refresh` is called when the server rejected the current token. Callers
///   that route failures through a `RetryCoordinator` invoke it at most once
///   per burst of concurrent failures.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns the current access token for the `Authorization: Bearer <token>` header.
    async fn token(&self) -> Result<SecretString, RetryError>;

    /// Obtains a fresh access token, replacing the current one.
    async fn refresh(&self) -> Result<SecretString, RetryError>;
}

/// A simple static token provider useful for tests and basic scenarios where
/// the token is managed externally. Refreshing returns the same token.
pub struct StaticTokenProvider {
    token: SecretString,
}

impl StaticTokenProvider {
    /// Create a new static token provider.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn token(&self) -> Result<SecretString, RetryError> {
        Ok(self.token.clone())
    }

    async fn refresh(&self) -> Result<SecretString, RetryError> {
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[tokio::test]
    async fn test_static_provider_refresh_keeps_token() {
        let provider = StaticTokenProvider::new("fixed");
        assert_eq!(provider.token().await.unwrap().expose_secret(), "fixed");
        assert_eq!(provider.refresh().await.unwrap().expose_secret(), "fixed");
    }
}
