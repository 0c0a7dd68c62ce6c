// src/api/client.rs
//! Pure HTTP client wrapper for Notion API.
//!
//! This module provides a thin wrapper around reqwest for making
//! HTTP requests to the Notion API. It handles authentication headers,
//! proxying and timeouts without parsing or business logic.

use super::transport::{ApiRequest, NotionTransport, TransportFactory};
use crate::constants::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS, NOTION_API_VERSION,
    TRACE_ID_HEADER,
};
use crate::error::{AppError, HttpVerb};
use crate::types::{ApiKey, ValidationError};
use reqwest::{header, Client, Response};
use std::sync::Arc;
use std::time::Duration;

/// Outbound HTTP proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySettings {
    pub host: String,
    pub port: u16,
}

impl ProxySettings {
    fn url(&self) -> String {
        if self.host.contains("://") {
            format!("{}:{}", self.host, self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }
}

/// Connection settings shared by every client a session builds.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub proxy: Option<ProxySettings>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            proxy: None,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

/// A thin wrapper around reqwest Client for Notion API requests.
#[derive(Clone)]
pub struct NotionHttpClient {
    client: Client,
}

impl NotionHttpClient {
    /// Creates a new HTTP client with Notion API authentication.
    pub fn new(api_key: &ApiKey, options: &ClientOptions) -> Result<Self, AppError> {
        let mut builder = Client::builder()
            .default_headers(Self::create_headers(api_key)?)
            .connect_timeout(options.connect_timeout)
            .timeout(options.request_timeout);

        if let Some(proxy) = &options.proxy {
            let proxy_url = proxy.url();
            log::info!("Routing Notion API calls through proxy {}", proxy_url);
            let proxy = reqwest::Proxy::all(&proxy_url).map_err(|e| {
                ValidationError::InvalidUrl {
                    url: proxy_url.clone(),
                    reason: e.to_string(),
                }
            })?;
            builder = builder.proxy(proxy);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Creates the default headers for Notion API requests.
    fn create_headers(api_key: &ApiKey) -> Result<header::HeaderMap, AppError> {
        let mut headers = header::HeaderMap::new();

        let auth_header = format!("Bearer {}", api_key.as_str());
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&auth_header).map_err(|e| {
                AppError::MissingConfiguration(format!("Invalid API token format: {}", e))
            })?,
        );

        headers.insert(
            "Notion-Version",
            header::HeaderValue::from_static(NOTION_API_VERSION),
        );

        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        Ok(headers)
    }
}

#[async_trait::async_trait]
impl NotionTransport for NotionHttpClient {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse<String>, AppError> {
        let builder = match request.verb {
            HttpVerb::Get => self.client.get(request.url),
            HttpVerb::Post => self.client.post(request.url),
        };
        let mut builder = builder.header(TRACE_ID_HEADER, request.trace_id.as_str());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        extract_response_text(response).await
    }
}

/// Builds reqwest-backed transports sharing one set of [`ClientOptions`].
#[derive(Debug, Clone, Default)]
pub struct HttpTransportFactory {
    options: ClientOptions,
}

impl HttpTransportFactory {
    pub fn new(options: ClientOptions) -> Self {
        Self { options }
    }
}

impl TransportFactory for HttpTransportFactory {
    fn connect(&self, credential: &ApiKey) -> Result<Arc<dyn NotionTransport>, AppError> {
        Ok(Arc::new(NotionHttpClient::new(credential, &self.options)?))
    }
}

/// Result of an HTTP operation with response metadata.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: reqwest::StatusCode,
    pub url: String,
}

/// Extracts the response body as text with metadata.
///
/// The body is read in full here, so the connection is released before the
/// caller inspects the status.
pub async fn extract_response_text(response: Response) -> Result<ApiResponse<String>, AppError> {
    let status = response.status();
    let url = response.url().to_string();
    let text = response.text().await?;

    Ok(ApiResponse {
        data: text,
        status,
        url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxy_url_defaults_to_http_scheme() {
        let proxy = ProxySettings {
            host: "proxy.internal".to_string(),
            port: 8080,
        };
        assert_eq!(proxy.url(), "http://proxy.internal:8080");

        let proxy = ProxySettings {
            host: "https://proxy.internal".to_string(),
            port: 443,
        };
        assert_eq!(proxy.url(), "https://proxy.internal:443");
    }

    #[test]
    fn client_builds_with_proxy_and_timeouts() {
        let key = ApiKey::new("secret_abcdefghijklmnopqrs").unwrap();
        let options = ClientOptions {
            proxy: Some(ProxySettings {
                host: "localhost".to_string(),
                port: 3128,
            }),
            ..ClientOptions::default()
        };
        assert!(NotionHttpClient::new(&key, &options).is_ok());
    }
}
