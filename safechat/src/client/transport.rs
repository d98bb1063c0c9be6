//! HTTP transport seam.
//!
//! The completion client only needs "POST these bytes with these headers and
//! give me the status and body back", so that is all [`HttpTransport`] offers.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::errors::ApiError;

/// A fully built outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// Target URL.
    pub url: String,
    /// Header name/value pairs, in send order.
    pub headers: Vec<(String, String)>,
    /// JSON body.
    pub body: serde_json::Value,
}

impl HttpRequest {
    /// Looks up a header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Result of a request that reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    /// Creates a response.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Protocol for sending a single JSON POST.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends `request` once. Non-2xx statuses are returned, not raised.
    async fn post_json(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// [`HttpTransport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::transport(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        // Content-Type travels in `request.headers`.
        let mut builder = self.client.post(&request.url).body(request.body.to_string());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::transport(format!("request timed out: {e}"))
            } else {
                ApiError::transport(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::transport(format!("failed to read response body: {e}")))?;

        debug!(status, body_len = body.len(), "Received completion response");
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_is_success() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(301, "").is_success());
        assert!(!HttpResponse::new(500, "").is_success());
    }

    #[test]
    fn test_request_header_lookup() {
        let request = HttpRequest {
            url: "http://localhost".to_string(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: serde_json::json!({}),
        };

        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.header("Authorization"), None);
    }
}
