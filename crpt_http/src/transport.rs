use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;

use crate::client::HttpClient;
use crate::errors::Result;

/// Header carrying the caller-supplied document signature
pub const SIGNATURE_HEADER: &str = "Signature";

/// A single POST to the registration endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub url: String,
    pub signature: String,
    /// Serialized JSON document
    pub body: String,
}

/// Status and body returned by the endpoint, whatever the status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends outbound requests on behalf of a [`DocumentClient`](crate::DocumentClient)
pub trait Transport: Send + Sync {
    /// POST `request.body` as JSON with the signature header attached
    fn post(&self, request: OutboundRequest) -> Pin<Box<dyn Future<Output = Result<ApiResponse>> + Send + '_>>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn post(&self, request: OutboundRequest) -> Pin<Box<dyn Future<Output = Result<ApiResponse>> + Send + '_>> {
        (**self).post(request)
    }
}

/// Transport backed by the pooled reqwest [`HttpClient`]
pub struct ReqwestTransport {
    client: HttpClient,
}

impl ReqwestTransport {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }
}

impl Transport for ReqwestTransport {
    fn post(&self, request: OutboundRequest) -> Pin<Box<dyn Future<Output = Result<ApiResponse>> + Send + '_>> {
        Box::pin(async move {
            let response = self
                .client
                .post(&request.url)
                .header(CONTENT_TYPE, "application/json")
                .header(SIGNATURE_HEADER, request.signature)
                .body(request.body)
                .send()
                .await?;

            let status = response.status().as_u16();
            let body = response.text().await?;

            Ok(ApiResponse { status, body })
        })
    }
}
