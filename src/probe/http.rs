//! HTTP probe built on reqwest.

use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, CONTENT_LENGTH};
use reqwest::{Client, Method, RequestBuilder};

use crate::health::CheckError;

/// Response captured by a probe request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
    /// Time from sending the request to reading the full body.
    pub response_time_ms: u64,
}

impl HttpResponse {
    /// Header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Declared Content-Length, falling back to the body size.
    pub fn content_length(&self) -> u64 {
        self.headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(self.body.len() as u64)
    }

    /// Status in `[200, 400)`.
    pub fn is_reachable(&self) -> bool {
        (200..400).contains(&self.status)
    }

    /// Body as JSON if it parses, else as a plain string.
    pub fn body_json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body)
            .unwrap_or_else(|_| serde_json::Value::String(self.body.clone()))
    }
}

/// Issues GET and OPTIONS requests with latency measurement.
///
/// Redirects are not followed: a 3xx from a freshly deployed endpoint is
/// reported as-is.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    /// Create a probe whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, CheckError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("deploy_health/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub async fn get(&self, url: &str) -> Result<HttpResponse, CheckError> {
        self.send(self.client.get(url)).await
    }

    /// Send an OPTIONS request with extra headers (CORS preflight).
    pub async fn options(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse, CheckError> {
        let mut request = self.client.request(Method::OPTIONS, url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        self.send(request).await
    }

    async fn send(&self, request: RequestBuilder) -> Result<HttpResponse, CheckError> {
        let started = Instant::now();
        let response = request.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await?;
        let response_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        tracing::debug!(status, response_time_ms, "probe response");

        Ok(HttpResponse {
            status,
            headers,
            body,
            response_time_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HeaderMap::new(),
            body: body.to_string(),
            response_time_ms: 10,
        }
    }

    #[test]
    fn test_reachable_range() {
        assert!(response(200, "").is_reachable());
        assert!(response(302, "").is_reachable());
        assert!(!response(400, "").is_reachable());
        assert!(!response(503, "").is_reachable());
        assert!(!response(199, "").is_reachable());
    }

    #[test]
    fn test_content_length() {
        let mut resp = response(200, "hello");
        assert_eq!(resp.content_length(), 5);

        resp.headers
            .insert(CONTENT_LENGTH, HeaderValue::from_static("1024"));
        assert_eq!(resp.content_length(), 1024);
    }

    #[test]
    fn test_body_json() {
        assert_eq!(response(200, r#"{"status":"ok"}"#).body_json()["status"], "ok");
        assert_eq!(response(200, "plain").body_json(), "plain");
    }

    #[tokio::test]
    async fn test_connection_refused_is_http_error() {
        // Bind and drop to get a port nothing listens on
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let probe = HttpProbe::new(Duration::from_secs(2)).unwrap();
        let err = probe
            .get(&format!("http://127.0.0.1:{}/health", port))
            .await
            .unwrap_err();
        assert!(err.is_network());
    }
}
