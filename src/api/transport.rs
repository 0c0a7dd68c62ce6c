// src/api/transport.rs
//! The seam between request logic and the wire.
//!
//! Everything above this trait (endpoint building, trace IDs, status checks,
//! pagination, caching) is transport-agnostic; the reqwest client is one
//! implementation and tests plug in scripted ones.

use super::client::ApiResponse;
use crate::error::{AppError, HttpVerb};
use crate::types::{ApiKey, TraceId};
use std::sync::Arc;
use url::Url;

/// A fully resolved outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub verb: HttpVerb,
    pub url: Url,
    pub body: Option<serde_json::Value>,
    pub trace_id: TraceId,
}

/// The ability to execute one request against the Notion API.
///
/// Implementations attach the credential they were built with. Transport
/// failures (DNS, TLS, timeouts) are errors; any HTTP status, including
/// error statuses, is a successful `ApiResponse`.
#[async_trait::async_trait]
pub trait NotionTransport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse<String>, AppError>;
}

/// Builds a transport bound to one credential.
///
/// A session calls this once at start and again on every credential swap.
pub trait TransportFactory: Send + Sync {
    fn connect(&self, credential: &ApiKey) -> Result<Arc<dyn NotionTransport>, AppError>;
}
