// tests/common/mod.rs
//! Scripted in-memory Notion API for driving a `NotionSession` in tests.
#![allow(dead_code)]

use notion2tasks::{
    ApiKey, ApiRequest, ApiResponse, AppError, NotionSession, NotionTransport, TransportFactory,
};
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use url::Url;

pub const DATABASE_ID: &str = "668d797c-76fa-4934-9b05-ad288df2d136";
pub const INTEGRATION_TOKEN: &str = "secret_integration_token_0001";
pub const OTHER_TOKEN: &str = "ntn_other_workspace_token_0002";

pub fn api_key(token: &str) -> ApiKey {
    ApiKey::new(token).expect("test token should be valid")
}

pub fn base_url() -> Url {
    Url::parse("https://api.notion.com/v1/").unwrap()
}

/// A request as the scripted server saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub credential: String,
    pub request: ApiRequest,
}

impl RecordedRequest {
    pub fn path(&self) -> &str {
        self.request.url.path()
    }

    pub fn body(&self) -> &Value {
        self.request.body.as_ref().unwrap_or(&Value::Null)
    }
}

type Handler = dyn Fn(&ApiRequest) -> (u16, String) + Send + Sync;

/// Answers every request through one handler and records what was sent.
pub struct ScriptedApi {
    handler: Arc<Handler>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    connects: AtomicUsize,
    refused_token: Option<String>,
}

impl ScriptedApi {
    pub fn new(handler: impl Fn(&ApiRequest) -> (u16, String) + Send + Sync + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
            requests: Arc::new(Mutex::new(Vec::new())),
            connects: AtomicUsize::new(0),
            refused_token: None,
        }
    }

    /// Makes `connect` fail for one token.
    pub fn refusing(mut self, token: &str) -> Self {
        self.refused_token = Some(token.to_string());
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl TransportFactory for ScriptedApi {
    fn connect(&self, credential: &ApiKey) -> Result<Arc<dyn NotionTransport>, AppError> {
        if self.refused_token.as_deref() == Some(credential.as_str()) {
            return Err(AppError::MissingConfiguration(
                "transport refused for test".to_string(),
            ));
        }
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(ScriptedTransport {
            credential: credential.as_str().to_string(),
            handler: Arc::clone(&self.handler),
            requests: Arc::clone(&self.requests),
        }))
    }
}

struct ScriptedTransport {
    credential: String,
    handler: Arc<Handler>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

#[async_trait::async_trait]
impl NotionTransport for ScriptedTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse<String>, AppError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            credential: self.credential.clone(),
            request: request.clone(),
        });
        let (status, body) = (self.handler)(&request);
        Ok(ApiResponse {
            data: body,
            status: StatusCode::from_u16(status).unwrap(),
            url: request.url.to_string(),
        })
    }
}

/// Opens a session over `api` with the integration token.
pub fn session(api: &Arc<ScriptedApi>) -> NotionSession {
    NotionSession::new(api.clone(), base_url(), &api_key(INTEGRATION_TOKEN)).unwrap()
}

pub fn ok(body: &str) -> (u16, String) {
    (200, body.to_string())
}

pub fn not_found() -> (u16, String) {
    (
        404,
        r#"{"object":"error","status":404,"code":"object_not_found","message":"Could not find database."}"#
            .to_string(),
    )
}

/// One page of a list response holding `results`.
pub fn list_page(results: Vec<Value>, next_cursor: Option<&str>) -> (u16, String) {
    let body = serde_json::json!({
        "object": "list",
        "results": results,
        "next_cursor": next_cursor,
        "has_more": next_cursor.is_some(),
    });
    ok(&body.to_string())
}
