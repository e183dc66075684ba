pub mod client;
pub mod document;
pub mod document_client;
pub mod errors;
pub mod serde_helpers;
pub mod transport;

pub use client::HttpClient;
pub use client::HttpClientConfig;
pub use document::Document;
pub use document::Product;
pub use document_client::ClientConfig;
pub use document_client::DocumentClient;
pub use document_client::DEFAULT_URL;
pub use errors::HttpError;
pub use errors::Result;
pub use transport::ApiResponse;
pub use transport::OutboundRequest;
pub use transport::ReqwestTransport;
pub use transport::Transport;
