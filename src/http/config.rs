//! Bearer retry configuration.

use std::time::Duration;

use reqwest::header::HeaderName;
use serde::{Deserialize, Serialize};

use crate::error::RetryError;

/// Default coordinator tag for credential refreshes.
pub const DEFAULT_TAG: &str = "auth";
/// Default header carrying the bearer token.
pub const DEFAULT_HEADER_NAME: &str = "authorization";

/// Configuration of a bearer-token refresh coordinator.
///
/// Deserializes from partial JSON; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BearerRetryConfig {
    /// Tag of the retry reason; also names the request marker.
    pub tag: String,
    /// Response statuses that trigger a token refresh.
    pub retry_statuses: Vec<u16>,
    /// Upper bound for a single refresh, in milliseconds.
    pub refresh_timeout_ms: Option<u64>,
    /// Header the token is written to, as `Bearer <token>`.
    pub header_name: String,
}

impl Default for BearerRetryConfig {
    fn default() -> Self {
        Self {
            tag: DEFAULT_TAG.to_string(),
            retry_statuses: vec![401],
            refresh_timeout_ms: None,
            header_name: DEFAULT_HEADER_NAME.to_string(),
        }
    }
}

impl BearerRetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, RetryError> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            RetryError::ConfigurationError(format!("Invalid bearer retry config: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_retry_statuses(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.retry_statuses = statuses.into_iter().collect();
        self
    }

    pub fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn with_header_name(mut self, name: impl Into<String>) -> Self {
        self.header_name = name.into();
        self
    }

    pub fn refresh_timeout(&self) -> Option<Duration> {
        self.refresh_timeout_ms.map(Duration::from_millis)
    }

    /// Whether a response with `status` should trigger a refresh.
    pub fn is_retry_status(&self, status: u16) -> bool {
        self.retry_statuses.contains(&status)
    }

    pub(crate) fn header(&self) -> Result<HeaderName, RetryError> {
        HeaderName::from_bytes(self.header_name.as_bytes()).map_err(|e| {
            RetryError::ConfigurationError(format!(
                "Invalid header name {:?}: {e}",
                self.header_name
            ))
        })
    }

    /// Check the configuration for values that cannot work.
    pub fn validate(&self) -> Result<(), RetryError> {
        if self.tag.trim().is_empty() {
            return Err(RetryError::ConfigurationError(
                "tag must not be empty".to_string(),
            ));
        }
        if self.retry_statuses.is_empty() {
            return Err(RetryError::ConfigurationError(
                "retry_statuses must not be empty".to_string(),
            ));
        }
        if let Some(status) = self
            .retry_statuses
            .iter()
            .find(|status| !(400..=599).contains(*status))
        {
            return Err(RetryError::ConfigurationError(format!(
                "retry status {status} is not an error status"
            )));
        }
        if self.refresh_timeout_ms == Some(0) {
            return Err(RetryError::ConfigurationError(
                "refresh_timeout_ms must be greater than zero".to_string(),
            ));
        }
        self.header()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BearerRetryConfig::default();
        assert_eq!(config.tag, "auth");
        assert_eq!(config.retry_statuses, vec![401]);
        assert_eq!(config.refresh_timeout(), None);
        assert!(config.is_retry_status(401));
        assert!(!config.is_retry_status(403));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            BearerRetryConfig::from_json(r#"{"retry_statuses":[401,419],"refresh_timeout_ms":250}"#)
                .unwrap();
        assert_eq!(config.tag, "auth");
        assert!(config.is_retry_status(419));
        assert_eq!(config.refresh_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(config.header_name, "authorization");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(BearerRetryConfig::new().with_tag(" ").validate().is_err());
        assert!(
            BearerRetryConfig::new()
                .with_retry_statuses([200])
                .validate()
                .is_err()
        );
        assert!(
            BearerRetryConfig::new()
                .with_retry_statuses(Vec::new())
                .validate()
                .is_err()
        );
        assert!(
            BearerRetryConfig::new()
                .with_header_name("bad header")
                .validate()
                .is_err()
        );
        assert!(matches!(
            BearerRetryConfig::from_json(r#"{"refresh_timeout_ms":0}"#),
            Err(RetryError::ConfigurationError(_))
        ));
    }
}
