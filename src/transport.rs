//! HTTP transport used by the client and the reporter.
//!
//! The rest of the crate only needs "GET a URL" and "POST a form", each
//! returning a status and a body. [`ReqwestTransport`] is the real
//! implementation; tests substitute scripted ones.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("ushahidi-rs/", env!("CARGO_PKG_VERSION"));

/// Status and body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Why a request produced no response at all.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("{0}")]
    Other(String),
}

/// Minimal HTTP capability.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;

    /// POST an `application/x-www-form-urlencoded` body.
    fn post_form(
        &self,
        url: &str,
        body: String,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// [`Transport`] backed by `reqwest`.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport whose requests expire after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;
        Ok(Self { client })
    }

    fn classify_error(e: &reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else {
            TransportError::Other(e.to_string())
        }
    }

    async fn read(
        url: &str,
        sent: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<HttpResponse, TransportError> {
        let response = sent.map_err(|e| {
            warn!(url, error = %e, "HTTP request failed");
            Self::classify_error(&e)
        })?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            warn!(url, error = %e, "Failed reading body");
            Self::classify_error(&e)
        })?;
        debug!(url, status, bytes = body.len(), "HTTP response");
        Ok(HttpResponse { status, body })
    }
}

impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        debug!(url, "HTTP GET start");
        let sent = self.client.get(url).send().await;
        Self::read(url, sent).await
    }

    async fn post_form(&self, url: &str, body: String) -> Result<HttpResponse, TransportError> {
        debug!(url, bytes = body.len(), "HTTP POST start");
        let sent = self
            .client
            .post(url)
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(body)
            .send()
            .await;
        Self::read(url, sent).await
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_range() {
        assert!(HttpResponse::ok("{}").is_success());
        assert!(HttpResponse { status: 204, body: String::new() }.is_success());
        assert!(!HttpResponse { status: 404, body: String::new() }.is_success());
        assert!(!HttpResponse { status: 500, body: String::new() }.is_success());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_transport_error() {
        let transport = ReqwestTransport::new(Duration::from_secs(2)).unwrap();
        // Port 9 (discard) on loopback is closed in test environments.
        let result = transport.get("http://127.0.0.1:9/api").await;
        assert!(result.is_err());
    }
}
