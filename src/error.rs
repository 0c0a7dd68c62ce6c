// src/error.rs
//! Application error types with structured error handling.
//!
//! Two families live here. `AppError` is fatal: it unwinds out of a fetch or
//! sync call. `TranslationWarning` is not an error at all from the caller's
//! point of view: a field that cannot be translated becomes empty and the
//! sync carries on, with the warning reported alongside the results.

use crate::constants::ERROR_BODY_PREVIEW_LENGTH;
use crate::types::{PropertyId, RecordId, TraceId};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Notion API error codes as a typed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotionErrorCode {
    /// API rate limit exceeded
    RateLimited,
    /// The requested object does not exist or is inaccessible
    ObjectNotFound,
    /// API key is invalid or expired
    Unauthorized,
    /// API key lacks permission for this resource
    RestrictedResource,
    /// Request body contains invalid JSON
    InvalidJson,
    /// Request parameters failed Notion's validation
    ValidationFailed,
    /// Conflict with current state of the resource
    Conflict,
    /// Notion internal server error
    InternalError,
    /// Notion is temporarily unavailable
    ServiceUnavailable,
    /// An error code this client doesn't recognize yet
    Unknown(String),
}

impl NotionErrorCode {
    /// Parse a Notion API error code string into the typed vocabulary.
    pub fn from_api_response(code: &str) -> Self {
        match code {
            "rate_limited" => Self::RateLimited,
            "object_not_found" => Self::ObjectNotFound,
            "unauthorized" => Self::Unauthorized,
            "restricted_resource" => Self::RestrictedResource,
            "invalid_json" => Self::InvalidJson,
            "validation_error" => Self::ValidationFailed,
            "conflict_error" => Self::Conflict,
            "internal_server_error" => Self::InternalError,
            "service_unavailable" => Self::ServiceUnavailable,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Extracts the `code` field of a Notion error body, if the body is one.
    pub fn from_error_body(body: &str) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        if value.get("object").and_then(|v| v.as_str()) != Some("error") {
            return None;
        }
        value
            .get("code")
            .and_then(|v| v.as_str())
            .map(Self::from_api_response)
    }

    /// Whether the credential itself was rejected.
    pub fn is_credential_problem(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::RestrictedResource)
    }
}

impl fmt::Display for NotionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited => write!(f, "rate_limited"),
            Self::ObjectNotFound => write!(f, "object_not_found"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::RestrictedResource => write!(f, "restricted_resource"),
            Self::InvalidJson => write!(f, "invalid_json"),
            Self::ValidationFailed => write!(f, "validation_error"),
            Self::Conflict => write!(f, "conflict_error"),
            Self::InternalError => write!(f, "internal_server_error"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
            Self::Unknown(code) => write!(f, "{}", code),
        }
    }
}

/// HTTP verbs the client issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HttpVerb {
    Get,
    Post,
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
        }
    }
}

/// A request that came back with a status other than the expected one.
///
/// Carries everything needed to correlate the failure with server-side logs:
/// the trace ID that was sent, plus previews of what went out and came back.
#[derive(Error, Debug, Clone)]
pub struct RemoteRequestError {
    pub status_code: u16,
    pub expected_status: u16,
    pub endpoint: String,
    pub verb: HttpVerb,
    pub payload_snippet: Option<String>,
    pub response_snippet: Option<String>,
    pub trace_id: TraceId,
    pub code: Option<NotionErrorCode>,
}

impl fmt::Display for RemoteRequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut message = format!(
            "Unexpected HTTP response status code {} for {} {}, expected {} (X-B3-TraceId: {})",
            self.status_code, self.verb, self.endpoint, self.expected_status, self.trace_id
        );
        if let Some(code) = &self.code {
            message.push_str(&format!(" [{}]", code));
        }
        if let Some(payload) = &self.payload_snippet {
            message.push_str(&format!("\nSent payload: {}", payload));
        }
        if let Some(response) = &self.response_snippet {
            message.push_str(&format!("\nReceived response: {}", response));
        }
        f.write_str(&message)
    }
}

/// Shortens a body for inclusion in error messages.
///
/// Returns `None` for blank bodies so empty sections are left out entirely.
pub fn preview(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut chars = trimmed.chars();
    let head: String = chars.by_ref().take(ERROR_BODY_PREVIEW_LENGTH).collect();
    if chars.next().is_some() {
        Some(format!("{}...", head))
    } else {
        Some(head)
    }
}

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Malformed endpoint '{path}' relative to {base}: {reason}")]
    MalformedEndpoint {
        base: String,
        path: String,
        reason: String,
    },

    #[error(transparent)]
    RemoteRequest(#[from] RemoteRequestError),

    #[error("Network failure: {0}")]
    NetworkFailure(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Filesystem IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error for {path}: {source}")]
    JsonParseError {
        path: std::path::PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Validation(#[from] crate::types::ValidationError),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedResponse(err.to_string())
    }
}

/// The kind of value a caller asks the translator for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Text,
    Date,
    Number,
    People,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Date => write!(f, "date"),
            Self::Number => write!(f, "number"),
            Self::People => write!(f, "people"),
        }
    }
}

/// A non-fatal problem met while translating one field.
///
/// Serializes with a `kind` tag so callers can audit warnings by machine
/// rather than grepping logs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TranslationWarning {
    /// The property's type cannot produce the requested kind of value.
    UnsupportedExtraction {
        record_id: RecordId,
        property_id: PropertyId,
        property_type: String,
        requested: ValueKind,
    },
    /// A date string matched none of the accepted formats.
    UnparseableDate {
        record_id: RecordId,
        property_id: PropertyId,
        raw: String,
    },
    /// A person reference matched no user in the directory.
    UnresolvedIdentity {
        record_id: RecordId,
        property_id: PropertyId,
        reference: String,
    },
    /// The field mapping names a property the database schema does not have.
    UnknownProperty {
        database_id: crate::types::DatabaseId,
        property_id: PropertyId,
        field: String,
    },
}

impl fmt::Display for TranslationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedExtraction {
                record_id,
                property_id,
                property_type,
                requested,
            } => write!(
                f,
                "record {}: cannot read {} from property {} of type {}",
                record_id, requested, property_id, property_type
            ),
            Self::UnparseableDate {
                record_id,
                property_id,
                raw,
            } => write!(
                f,
                "record {}: failed to parse date '{}' in property {}, ignoring date",
                record_id, raw, property_id
            ),
            Self::UnresolvedIdentity {
                record_id,
                property_id,
                reference,
            } => write!(
                f,
                "record {}: no user found for '{}' in property {}",
                record_id, reference, property_id
            ),
            Self::UnknownProperty {
                database_id,
                property_id,
                field,
            } => write!(
                f,
                "database {}: mapped {} property {} does not exist",
                database_id, field, property_id
            ),
        }
    }
}

/// Logs a warning and appends it to the caller's collection.
pub fn report_warning(warnings: &mut Vec<TranslationWarning>, warning: TranslationWarning) {
    log::warn!("{}", warning);
    warnings.push(warning);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_is_read_from_notion_error_body() {
        let body = r#"{"object":"error","status":401,"code":"unauthorized","message":"API token is invalid."}"#;
        let code = NotionErrorCode::from_error_body(body);
        assert_eq!(code, Some(NotionErrorCode::Unauthorized));
        assert!(code.unwrap().is_credential_problem());
    }

    #[test]
    fn non_error_bodies_have_no_code() {
        assert_eq!(NotionErrorCode::from_error_body("<html>bad gateway</html>"), None);
        assert_eq!(NotionErrorCode::from_error_body(r#"{"object":"list"}"#), None);
    }

    #[test]
    fn preview_skips_blank_and_truncates_long_bodies() {
        assert_eq!(preview("   "), None);
        assert_eq!(preview("short"), Some("short".to_string()));

        let long = "x".repeat(ERROR_BODY_PREVIEW_LENGTH + 10);
        let shown = preview(&long).unwrap();
        assert!(shown.ends_with("..."));
        assert_eq!(shown.len(), ERROR_BODY_PREVIEW_LENGTH + 3);
    }

    #[test]
    fn remote_request_error_mentions_trace_and_payload() {
        let trace_id = TraceId::generate();
        let err = RemoteRequestError {
            status_code: 400,
            expected_status: 200,
            endpoint: "https://api.notion.com/v1/search".to_string(),
            verb: HttpVerb::Post,
            payload_snippet: Some(r#"{"page_size":100}"#.to_string()),
            response_snippet: None,
            trace_id: trace_id.clone(),
            code: Some(NotionErrorCode::ValidationFailed),
        };
        let message = err.to_string();
        assert!(message.contains("400 for POST https://api.notion.com/v1/search"));
        assert!(message.contains(trace_id.as_str()));
        assert!(message.contains("[validation_error]"));
        assert!(message.contains("Sent payload"));
        assert!(!message.contains("Received response"));
    }

    #[test]
    fn warnings_serialize_with_kind_tag() {
        let warning = TranslationWarning::UnresolvedIdentity {
            record_id: RecordId::parse("550e8400e29b41d4a716446655440000").unwrap(),
            property_id: PropertyId::new("owner").unwrap(),
            reference: "ghost@example.com".to_string(),
        };
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["kind"], "unresolved_identity");
        assert_eq!(json["record_id"], "550e8400-e29b-41d4-a716-446655440000");
        assert_eq!(json["reference"], "ghost@example.com");
    }
}
