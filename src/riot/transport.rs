//! A single network attempt against the Riot API.
//!
//! The transport knows nothing about quotas or retries; it sends one GET to
//! `https://{partition}.{api_domain}{path}` and reports the status, the
//! `Retry-After` header and the body.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER, USER_AGENT};
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

/// Errors raised by the transport itself (connection, TLS, timeouts).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),
}

/// What came back from one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub retry_after_secs: Option<u64>,
    pub body: String,
}

impl RawResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            retry_after_secs: None,
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            retry_after_secs: None,
            body: String::new(),
        }
    }

    pub fn throttled(retry_after_secs: Option<u64>) -> Self {
        Self {
            status: 429,
            retry_after_secs,
            body: String::new(),
        }
    }
}

/// Sends one request on a partition.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Transport name for logging.
    fn name(&self) -> &'static str;

    async fn send(&self, partition: &str, path: &str) -> Result<RawResponse, TransportError>;
}

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    pub api_key: String,
    pub api_domain: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl HttpTransportConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_domain: "api.riotgames.com".to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("rift-meta/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// reqwest-backed transport.
pub struct HttpTransport {
    client: Client,
    api_domain: String,
}

impl HttpTransport {
    pub fn new(config: HttpTransportConfig) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("rift-meta")),
        );
        let mut token = HeaderValue::from_str(&config.api_key)
            .map_err(|_| TransportError::InvalidHeader("X-Riot-Token".to_string()))?;
        token.set_sensitive(true);
        headers.insert("X-Riot-Token", token);

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            api_domain: config.api_domain,
        })
    }

    fn url_for(&self, partition: &str, path: &str) -> String {
        format!("https://{}.{}{}", partition, self.api_domain, path)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &'static str {
        "riot-http"
    }

    async fn send(&self, partition: &str, path: &str) -> Result<RawResponse, TransportError> {
        let url = self.url_for(partition, path);
        debug!(partition, path, "GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status().as_u16();
        let retry_after_secs = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse().ok());
        let body = response.text().await?;

        Ok(RawResponse {
            status,
            retry_after_secs,
            body,
        })
    }
}

/// Scripted transport for tests.
#[cfg(test)]
pub(crate) mod mock {
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::time::Instant;

    use super::{RawResponse, Transport, TransportError};

    /// One recorded attempt.
    #[derive(Debug, Clone)]
    pub struct Call {
        pub partition: String,
        pub path: String,
        pub at: Instant,
    }

    /// Replies from per-path scripts. The last scripted response for a path
    /// repeats; unscripted paths get the fallback (404 unless overridden).
    pub struct MockTransport {
        routes: Mutex<HashMap<String, VecDeque<RawResponse>>>,
        fallback: RawResponse,
        calls: Mutex<Vec<Call>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::with_fallback(RawResponse::status(404))
        }

        pub fn with_fallback(fallback: RawResponse) -> Self {
            Self {
                routes: Mutex::new(HashMap::new()),
                fallback,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn push(&self, path: &str, response: RawResponse) -> &Self {
            self.routes
                .lock()
                .unwrap()
                .entry(path.to_string())
                .or_default()
                .push_back(response);
            self
        }

        pub fn push_json(&self, path: &str, value: serde_json::Value) -> &Self {
            self.push(path, RawResponse::ok(value.to_string()))
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        pub fn calls_to(&self, path: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.path == path)
                .count()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        fn name(&self) -> &'static str {
            "mock"
        }

        async fn send(&self, partition: &str, path: &str) -> Result<RawResponse, TransportError> {
            self.calls.lock().unwrap().push(Call {
                partition: partition.to_string(),
                path: path.to_string(),
                at: Instant::now(),
            });

            let mut routes = self.routes.lock().unwrap();
            let response = match routes.get_mut(path) {
                Some(script) if script.len() > 1 => script.pop_front(),
                Some(script) => script.front().cloned(),
                None => None,
            };
            Ok(response.unwrap_or_else(|| self.fallback.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockTransport;
    use super::*;

    #[test]
    fn test_url_for() {
        let transport = HttpTransport::new(HttpTransportConfig::new("RGAPI-test")).unwrap();
        assert_eq!(
            transport.url_for("eun1", "/lol/summoner/v4/summoners/by-puuid/abc"),
            "https://eun1.api.riotgames.com/lol/summoner/v4/summoners/by-puuid/abc"
        );
    }

    #[test]
    fn test_rejects_unprintable_api_key() {
        let result = HttpTransport::new(HttpTransportConfig::new("bad\nkey"));
        assert!(matches!(result, Err(TransportError::InvalidHeader(_))));
    }

    #[test]
    fn test_config_defaults() {
        let config = HttpTransportConfig::new("key");
        assert_eq!(config.api_domain, "api.riotgames.com");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("rift-meta/"));
    }

    #[tokio::test]
    async fn test_mock_script_repeats_last_response() {
        let transport = MockTransport::new();
        transport
            .push("/a", RawResponse::throttled(Some(1)))
            .push("/a", RawResponse::ok("{}"));

        assert_eq!(transport.send("eun1", "/a").await.unwrap().status, 429);
        assert_eq!(transport.send("eun1", "/a").await.unwrap().status, 200);
        assert_eq!(transport.send("eun1", "/a").await.unwrap().status, 200);
        assert_eq!(transport.send("eun1", "/b").await.unwrap().status, 404);
        assert_eq!(transport.calls_to("/a"), 3);
    }
}
