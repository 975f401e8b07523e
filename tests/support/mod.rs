use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use retry_queue::auth::TokenProvider;
use retry_queue::error::RetryError;
use secrecy::SecretString;

/// Hands out `bad` until refreshed, then `ok`.
pub struct FlippingTokenProvider {
    pub refreshes: AtomicUsize,
    current: Mutex<String>,
    delay: Duration,
    fail_with: Option<RetryError>,
}

impl FlippingTokenProvider {
    pub fn new(delay: Duration) -> Self {
        Self {
            refreshes: AtomicUsize::new(0),
            current: Mutex::new("bad".to_string()),
            delay,
            fail_with: None,
        }
    }

    pub fn failing(error: RetryError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::new(Duration::from_millis(50))
        }
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenProvider for FlippingTokenProvider {
    async fn token(&self) -> Result<SecretString, RetryError> {
        Ok(SecretString::from(self.current.lock().unwrap().clone()))
    }

    async fn refresh(&self) -> Result<SecretString, RetryError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        if let Some(error) = &self.fail_with {
            return Err(error.clone());
        }
        let mut current = self.current.lock().unwrap();
        *current = "ok".to_string();
        Ok(SecretString::from(current.clone()))
    }
}
