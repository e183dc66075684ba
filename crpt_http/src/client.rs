use std::time::Duration;

use reqwest::Client;
use reqwest::ClientBuilder;
use serde::Deserialize;

use crate::errors::Result;

/// Configuration for the HTTP client.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    /// Maximum idle connections per host (default: 10)
    pub pool_max_idle_per_host: usize,

    /// Idle timeout for pooled connections in ms (default: 90s)
    pub pool_idle_timeout_ms: u64,

    /// Connection establishment timeout in ms (default: 10s)
    pub connect_timeout_ms: u64,

    /// Total request timeout in ms (default: 30s)
    pub request_timeout_ms: u64,

    /// TCP keepalive interval in ms (default: 60s)
    pub tcp_keepalive_ms: u64,

    /// Enable TCP_NODELAY (default: true)
    pub tcp_nodelay: bool,

    /// Enable Hickory DNS for async resolution (default: true)
    pub hickory_dns: bool,

    /// User-Agent header sent with every request
    pub user_agent: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: 10,
            pool_idle_timeout_ms: 90_000,
            connect_timeout_ms: 10_000,
            request_timeout_ms: 30_000,
            tcp_keepalive_ms: 60_000,
            tcp_nodelay: true,
            hickory_dns: true,
            user_agent: None,
        }
    }
}

impl HttpClientConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Pooled reqwest client over rustls
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let mut builder = ClientBuilder::new()
            // Connection pooling
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(Duration::from_millis(config.pool_idle_timeout_ms))
            // TCP
            .tcp_nodelay(config.tcp_nodelay)
            .tcp_keepalive(Some(Duration::from_millis(config.tcp_keepalive_ms)))
            // Timeouts
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            // TLS with rustls
            .use_rustls_tls()
            .min_tls_version(reqwest::tls::Version::TLS_1_2)
            // Compression
            .gzip(true)
            .brotli(true);

        if config.hickory_dns {
            builder = builder.hickory_dns(true);
        }

        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }

        let client = builder.build()?;

        Ok(Self { client, config })
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Create a POST request builder
    pub fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.client.post(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpClientConfig::default();
        assert_eq!(config.pool_max_idle_per_host, 10);
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.tcp_nodelay);
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: HttpClientConfig = serde_json::from_str(r#"{"request_timeout_ms": 5000, "user_agent": "crpt-client/0.1"}"#).unwrap();
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.user_agent.as_deref(), Some("crpt-client/0.1"));
    }

    #[test]
    fn test_client_creation() {
        let client = HttpClient::new();
        assert!(client.is_ok());
    }

    #[test]
    fn test_client_with_custom_config() {
        let config = HttpClientConfig { hickory_dns: false, user_agent: Some("test".to_string()), ..Default::default() };
        let client = HttpClient::with_config(config).unwrap();
        assert!(!client.config().hickory_dns);
    }
}
