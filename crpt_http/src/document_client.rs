use crpt_ratelimit::CancellationToken;
use crpt_ratelimit::Permit;
use crpt_ratelimit::RateLimiter;
use crpt_ratelimit::ReleaseMode;
use crpt_ratelimit::TimeUnit;
use reqwest::Url;
use serde::Deserialize;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::client::HttpClient;
use crate::client::HttpClientConfig;
use crate::document::Document;
use crate::errors::HttpError;
use crate::errors::Result;
use crate::transport::ApiResponse;
use crate::transport::OutboundRequest;
use crate::transport::ReqwestTransport;
use crate::transport::Transport;

/// Document creation endpoint
pub const DEFAULT_URL: &str = "https://ismp.crpt.ru/api/v3/lk/documents/create";

/// Configuration for a [`DocumentClient`]
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Endpoint every document is posted to
    pub url: String,

    /// Replenishment window, always one unit long (default: seconds)
    pub time_unit: TimeUnit,

    /// Submissions admitted per window (default: 5)
    pub request_limit: u32,

    /// Whether the window starts at admission or at completion of the call
    pub release_mode: ReleaseMode,

    pub http: HttpClientConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            time_unit: TimeUnit::Seconds,
            request_limit: 5,
            release_mode: ReleaseMode::default(),
            http: HttpClientConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Build the limiter described by this configuration
    pub fn rate_limiter(&self) -> Result<RateLimiter> {
        let limiter = RateLimiter::builder()
            .time_unit(self.time_unit)
            .request_limit(self.request_limit)
            .release_mode(self.release_mode)
            .build()?;
        Ok(limiter)
    }
}

/// Throttled client for the document registration endpoint
///
/// Each submission waits for a permit from the shared [`RateLimiter`], then
/// makes exactly one call through the [`Transport`]. The permit is held until
/// the call returns, so its release is scheduled whether the call succeeded,
/// failed or was abandoned.
pub struct DocumentClient<T = ReqwestTransport> {
    limiter: RateLimiter,
    transport: T,
    url: String,
}

impl DocumentClient<ReqwestTransport> {
    /// Build a client with its own limiter and reqwest transport
    pub fn new(config: ClientConfig) -> Result<Self> {
        Url::parse(&config.url).map_err(|err| HttpError::InvalidConfig(format!("invalid url {:?}: {}", config.url, err)))?;

        let limiter = config.rate_limiter()?;
        let transport = ReqwestTransport::new(HttpClient::with_config(config.http)?);

        info!(url = %config.url, limit = limiter.capacity(), window = ?limiter.window(), mode = ?limiter.release_mode(), "document client ready");

        Ok(Self::with_parts(limiter, transport, config.url))
    }
}

impl<T: Transport> DocumentClient<T> {
    /// Assemble a client from an existing limiter and transport
    ///
    /// Clients built from clones of one limiter share its capacity.
    pub fn with_parts(limiter: RateLimiter, transport: T, url: impl Into<String>) -> Self {
        Self { limiter, transport, url: url.into() }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Submit a document, waiting as long as needed for admission
    ///
    /// Any HTTP status is returned as an [`ApiResponse`]; only transport
    /// failures become errors.
    pub async fn submit(&self, document: &Document, signature: &str) -> Result<ApiResponse> {
        let permit = self.limiter.acquire().await?;
        self.send(permit, document, signature).await
    }

    /// Like [`submit`](Self::submit), giving up on admission once `cancel` fires
    ///
    /// Cancellation only affects the wait; a call already on the wire runs to
    /// completion.
    pub async fn submit_with_cancel(&self, document: &Document, signature: &str, cancel: &CancellationToken) -> Result<ApiResponse> {
        let permit = self.limiter.acquire_with_cancel(cancel).await?;
        self.send(permit, document, signature).await
    }

    async fn send(&self, permit: Permit, document: &Document, signature: &str) -> Result<ApiResponse> {
        // Held until this returns; dropping it schedules the release
        let _permit = permit;

        let request = OutboundRequest { url: self.url.clone(), signature: signature.to_owned(), body: document.to_json()? };

        match self.transport.post(request).await {
            Ok(response) => {
                if response.is_success() {
                    info!(status = response.status, body = %response.body, "document submitted");
                } else {
                    warn!(status = response.status, body = %response.body, "document rejected");
                }
                Ok(response)
            }
            Err(err) => {
                error!(error = %err, "document submission failed");
                Err(err)
            }
        }
    }
}
