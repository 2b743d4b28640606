//! HTTP transport abstraction
//!
//! A thin async seam over the transport so the client can be exercised
//! against a mock in tests. The production implementation wraps `reqwest`.
//! The disk API is read-only from our side, so the surface is GET-only.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, YandexDiskError};

/// A single GET request against the disk API
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub headers: HashMap<String, String>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::new(),
            timeout: None,
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Authorization header using the `OAuth <token>` scheme of the disk API.
    pub fn oauth_token(self, token: impl Into<String>) -> Self {
        self.header("Authorization", format!("OAuth {}", token.into()))
    }

    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }
}

/// HTTP response
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    /// Parse the response body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| YandexDiskError::InvalidResponse {
            status: self.status,
            message: format!("malformed JSON body: {}", e),
        })
    }

    /// Response body as a lossy UTF-8 string, for error reporting
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Check if response status is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Async HTTP transport trait
///
/// Implemented by [`ReqwestHttpClient`] in production and mocked in tests.
/// Implementations surface transport failures as-is; there is no retry layer,
/// the caller decides how to react to a failed round trip.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Execute a GET request
    ///
    /// # Errors
    ///
    /// Returns [`YandexDiskError::Transport`] if the network connection
    /// fails or the request times out. Non-2xx statuses are NOT errors at
    /// this layer; they come back in the response for the caller to map.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Reqwest-based HTTP client implementation
///
/// Provides connection pooling and TLS by default.
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a new HTTP client with custom timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .user_agent("disk-mirror/0.1.0")
            .build()
            .expect("Failed to build HTTP client");

        Self { client }
    }

    /// Create a new HTTP client around an existing reqwest client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(url = %request.url, "Executing HTTP request");

        let mut req = self.client.get(&request.url);
        for (key, value) in request.headers {
            req = req.header(key, value);
        }
        if let Some(timeout) = request.timeout {
            req = req.timeout(timeout);
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                YandexDiskError::Transport("request timed out".to_string())
            } else if e.is_connect() {
                YandexDiskError::Transport(format!("connection failed: {}", e))
            } else {
                YandexDiskError::Transport(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| YandexDiskError::Transport(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}
