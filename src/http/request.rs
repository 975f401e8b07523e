//! Replayable HTTP requests and buffered responses.
//!
//! `reqwest::Request` bodies are not always cloneable, so failed requests are
//! kept as descriptors that can be turned into a fresh `RequestBuilder` for
//! every attempt.

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;

use crate::error::RetryError;
use crate::retry::{RequestFailure, RetryMarker, RetryMarks};

/// A failed HTTP request paired with its error.
pub type HttpFailure = RequestFailure<HttpRequestDescriptor, RetryError>;

/// Everything needed to (re)send a request.
#[derive(Debug, Clone)]
pub struct HttpRequestDescriptor {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
    marks: RetryMarks,
}

impl HttpRequestDescriptor {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
            marks: RetryMarks::new(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// POST with a JSON body.
    pub fn post_json(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(Method::POST, url).with_json(body)
    }

    pub fn with_json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Add a header, rejecting invalid names or values.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, RetryError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| RetryError::ConfigurationError(format!("Invalid header name: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| RetryError::ConfigurationError(format!("Invalid header value: {e}")))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Retry markers set on this request.
    pub fn marks(&self) -> &RetryMarks {
        &self.marks
    }

    /// Build a `RequestBuilder` for one attempt.
    pub fn to_builder(&self, client: &reqwest::Client) -> reqwest::RequestBuilder {
        let builder = client
            .request(self.method.clone(), &self.url)
            .headers(self.headers.clone());
        match &self.body {
            Some(body) => builder.json(body),
            None => builder,
        }
    }
}

impl RetryMarker for HttpRequestDescriptor {
    fn has_marker(&self, key: &str) -> bool {
        self.marks.has_marker(key)
    }

    fn set_marker(&mut self, key: &str) {
        self.marks.set_marker(key)
    }
}

/// A fully read response with a success status.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, RetryError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| RetryError::ParseError(format!("Failed to parse response body: {e}")))
    }

    /// Body as UTF-8 text, lossily decoded.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Send one attempt of `request`, writing `Bearer <token>` into `header`.
///
/// Non-success statuses become `RetryError::ApiError` carrying the status and
/// the (JSON, when possible) body.
pub(crate) async fn send_with_token(
    client: &reqwest::Client,
    request: &HttpRequestDescriptor,
    header: &HeaderName,
    token: &str,
) -> Result<HttpResponse, RetryError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|e| RetryError::AuthenticationError(format!("Invalid bearer token: {e}")))?;
    value.set_sensitive(true);

    let response = request
        .to_builder(client)
        .header(header.clone(), value)
        .send()
        .await?;

    let status = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await?.to_vec();

    if status.is_success() {
        tracing::trace!(target: "retry_queue::http", url = %request.url, status = status.as_u16(), "response received");
        return Ok(HttpResponse {
            status: status.as_u16(),
            headers,
            body,
        });
    }

    tracing::debug!(target: "retry_queue::http", url = %request.url, status = status.as_u16(), "request failed");
    let text = String::from_utf8_lossy(&body).into_owned();
    Err(RetryError::ApiError {
        code: status.as_u16(),
        message: if text.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            text
        },
        details: serde_json::from_slice(&body).ok(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::marker_key;

    #[test]
    fn test_descriptor_builder() {
        let request = HttpRequestDescriptor::post_json(
            "http://localhost/v1/items",
            serde_json::json!({"name": "a"}),
        )
        .with_header("x-request-id", "abc")
        .unwrap();

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.headers["x-request-id"], "abc");
        assert!(request.body.is_some());
        assert!(request.marks().is_empty());
        assert!(
            HttpRequestDescriptor::get("http://localhost")
                .with_header("bad header", "x")
                .is_err()
        );
    }

    #[test]
    fn test_descriptor_carries_markers_across_clones() {
        let mut request = HttpRequestDescriptor::get("http://localhost");
        request.set_marker(&marker_key("auth"));
        let replay = request.clone();
        assert!(replay.has_marker("_retryauth"));
    }

    #[test]
    fn test_response_decoding() {
        let response = HttpResponse {
            status: 200,
            headers: HeaderMap::new(),
            body: br#"{"ok":true}"#.to_vec(),
        };
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["ok"], serde_json::json!(true));
        assert_eq!(response.text(), r#"{"ok":true}"#);
    }
}
