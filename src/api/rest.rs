// src/api/rest.rs
//! Request plumbing on top of a transport: endpoint resolution, trace IDs,
//! status validation and JSON decoding.

use super::client::ApiResponse;
use super::parser::decode_body;
use super::transport::{ApiRequest, NotionTransport};
use crate::error::{preview, AppError, HttpVerb, NotionErrorCode, RemoteRequestError};
use crate::types::TraceId;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

/// Every Notion read endpoint answers 200 on success.
const EXPECTED_STATUS: StatusCode = StatusCode::OK;

/// Issues JSON requests relative to the API base URL.
#[derive(Clone)]
pub struct RestClient {
    transport: Arc<dyn NotionTransport>,
    base_url: Url,
}

impl RestClient {
    pub fn new(transport: Arc<dyn NotionTransport>, base_url: Url) -> Self {
        Self {
            transport,
            base_url,
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let (body, url) = self.send(HttpVerb::Get, path, None).await?;
        decode_body(&body, &url)
    }

    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &Value,
    ) -> Result<T, AppError> {
        let (body, url) = self.send(HttpVerb::Post, path, Some(payload.clone())).await?;
        decode_body(&body, &url)
    }

    /// Sends one request and returns the validated body with the URL it came from.
    async fn send(
        &self,
        verb: HttpVerb,
        path: &str,
        body: Option<Value>,
    ) -> Result<(String, String), AppError> {
        let url = resolve_endpoint(&self.base_url, path)?;
        let trace_id = TraceId::generate();
        log::debug!("{} {} (trace {})", verb, url, trace_id);

        let request = ApiRequest {
            verb,
            url: url.clone(),
            body: body.clone(),
            trace_id: trace_id.clone(),
        };
        let response = self.transport.execute(request).await?;
        let data = check_response_status(response, verb, body.as_ref(), &trace_id)?;
        Ok((data, url.to_string()))
    }
}

/// Joins `path` onto the API base URL.
///
/// Fails when the base cannot carry paths or when the joined URL would leave
/// the base (absolute URLs, `..` segments, a base missing its trailing `/`).
pub fn resolve_endpoint(base: &Url, path: &str) -> Result<Url, AppError> {
    let malformed = |reason: String| AppError::MalformedEndpoint {
        base: base.to_string(),
        path: path.to_string(),
        reason,
    };

    if base.cannot_be_a_base() {
        return Err(malformed("base URL cannot carry a path".to_string()));
    }

    let joined = base.join(path).map_err(|e| malformed(e.to_string()))?;
    if !joined.as_str().starts_with(base.as_str()) {
        return Err(malformed(format!("resolves outside the API root to {}", joined)));
    }
    Ok(joined)
}

/// Returns the body when the status is the expected one; otherwise builds a
/// [`RemoteRequestError`] with everything needed to trace the call.
pub fn check_response_status(
    response: ApiResponse<String>,
    verb: HttpVerb,
    payload: Option<&Value>,
    trace_id: &TraceId,
) -> Result<String, AppError> {
    if response.status == EXPECTED_STATUS {
        return Ok(response.data);
    }

    let error = RemoteRequestError {
        status_code: response.status.as_u16(),
        expected_status: EXPECTED_STATUS.as_u16(),
        endpoint: response.url,
        verb,
        payload_snippet: payload.and_then(|p| preview(&p.to_string())),
        response_snippet: preview(&response.data),
        trace_id: trace_id.clone(),
        code: NotionErrorCode::from_error_body(&response.data),
    };
    log::error!("{}", error);
    Err(error.into())
}
