// src/lib.rs
//! notion2tasks library: imports Notion databases as normalized work-plan tasks.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling**: `AppError`, `ValidationError`, `TranslationWarning`
//! - **Configuration**: `CommandLineInput`, `ConnectionSettings`
//! - **Domain model**: `RemoteDatabase`, `RemoteRecord`, `FieldMapping`, `NormalizedTask`
//! - **Domain types**: `NotionId`, `ApiKey`, `PropertyId`, `UserId`
//! - **API client**: `NotionSession`, `NotionTransport`, `fetch_all`
//! - **Translation**: `PropertyTranslator`, `UserDirectory`, `materialize`, `sync_work_plan`

pub mod api;
mod config;
mod constants;
mod error;
mod materialize;
mod model;
mod sync;
mod translate;
mod types;

// --- Error Handling ---
pub use crate::error::{
    AppError, HttpVerb, NotionErrorCode, RemoteRequestError, TranslationWarning, ValueKind,
};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{
    load_mapping, parse_database_id, resolve_credential, Command, CommandLineInput,
    ConnectionSettings, SyncArgs,
};

// --- Domain Model ---
pub use crate::model::{
    mapping_candidates, sorted_by_name, DateRange, DateSide, FieldMapping, MappingCandidate,
    NormalizedTask, PersonRef, PropertyData, PropertyDefinition, PropertyKind, PropertyRef,
    PropertyValue, RemoteDatabase, RemoteRecord, RichTextSegment, TargetField, TaskActuals,
    TaskStatus,
};

// --- Domain Types ---
pub use crate::types::{ApiKey, DatabaseId, NotionId, PropertyId, RecordId, TraceId, UserId};

// --- API Client ---
pub use crate::api::{
    fetch_all, ApiRequest, ApiResponse, ClientOptions, NotionHttpClient, NotionSession,
    NotionTransport, ProxySettings, TransportFactory,
};

// --- Translation ---
pub use crate::materialize::materialize;
pub use crate::sync::{sync_work_plan, SyncRequest, WorkPlan};
pub use crate::translate::{
    parse_notion_date, split_email_list, DirectoryEntry, InMemoryDirectory, PropertyTranslator,
    TranslatedValue, UserDirectory,
};
