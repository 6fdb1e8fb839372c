//! HTTP Client Abstraction
//!
//! The core only needs HTTP to pull complete audio payloads into the offline
//! cache. Hosts decide how the request leaves the process (`reqwest` natively,
//! `fetch` in the browser).

use bytes::Bytes;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::{BridgeError, Result};
use crate::platform::PlatformSendSync;

/// HTTP method types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
        }
    }
}

/// HTTP request builder
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            timeout: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
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
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl HttpResponse {
    /// Check if response status is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Content type reported by the server, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .map(|(_, value)| value.as_str())
    }
}

/// Async HTTP client trait
///
/// Implementations perform a single request and report transport failures as
/// [`BridgeError::OperationFailed`]. Non-2xx responses are returned as-is from
/// [`execute`](HttpClient::execute); [`fetch_bytes`](HttpClient::fetch_bytes)
/// turns them into [`BridgeError::HttpStatus`].
///
/// # Example
///
/// ```ignore
/// use bridge_traits::http::HttpClient;
///
/// async fn pull(client: &dyn HttpClient, url: &str) -> bridge_traits::error::Result<usize> {
///     let payload = client.fetch_bytes(url).await?;
///     Ok(payload.len())
/// }
/// ```
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait HttpClient: PlatformSendSync {
    /// Execute an HTTP request
    ///
    /// # Errors
    ///
    /// Returns error if the connection fails, the request is blocked by the
    /// host (CORS in the browser) or the request times out.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;

    /// Fetch the complete body of `url`, failing on any non-2xx status.
    async fn fetch_bytes(&self, url: &str) -> Result<Bytes> {
        let response = self.execute(HttpRequest::get(url)).await?;
        if !response.is_success() {
            return Err(BridgeError::HttpStatus {
                status: response.status,
                url: url.to_string(),
            });
        }
        Ok(response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mockall::mock! {
        Client {}

        #[async_trait::async_trait]
        impl HttpClient for Client {
            async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
        }
    }

    #[test]
    fn test_http_request_builder() {
        let request = HttpRequest::get("https://example.com/audio.mp3")
            .header("Accept", "audio/*")
            .timeout(Duration::from_secs(30));

        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url, "https://example.com/audio.mp3");
        assert_eq!(request.headers.get("Accept"), Some(&"audio/*".to_string()));
        assert_eq!(request.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_content_type_lookup_is_case_insensitive() {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "audio/mpeg".to_string());
        let response = HttpResponse {
            status: 200,
            headers,
            body: Bytes::new(),
        };

        assert!(response.is_success());
        assert_eq!(response.content_type(), Some("audio/mpeg"));
    }

    #[tokio::test]
    async fn test_fetch_bytes_returns_body_on_success() {
        let mut client = MockClient::new();
        client.expect_execute().returning(|request| {
            assert_eq!(request.method, HttpMethod::Get);
            Ok(HttpResponse {
                status: 200,
                headers: HashMap::new(),
                body: Bytes::from_static(b"ID3"),
            })
        });

        let body = client.fetch_bytes("https://cdn.test/a.mp3").await.unwrap();
        assert_eq!(body.as_ref(), b"ID3");
    }

    #[tokio::test]
    async fn test_fetch_bytes_rejects_error_status() {
        let mut client = MockClient::new();
        client.expect_execute().returning(|_| {
            Ok(HttpResponse {
                status: 404,
                headers: HashMap::new(),
                body: Bytes::new(),
            })
        });

        let err = client.fetch_bytes("https://cdn.test/missing.mp3").await.unwrap_err();
        assert!(err.is_network());
        assert!(err.to_string().contains("404"));
    }
}
