// src/api/session.rs
//! Credential-bound session with a schema cache.
//!
//! Database listings and schemas are stable for the lifetime of a credential,
//! so they are fetched at most once and reused. A different credential may
//! see a different workspace: swapping it replaces the transport and both
//! caches in a single assignment.

use super::client::{ClientOptions, HttpTransportFactory};
use super::pagination::fetch_all;
use super::parser::{databases_page, records_page};
use super::responses::{DatabaseObject, PageObject, PaginatedResponse, ToDomain};
use super::rest::RestClient;
use super::transport::TransportFactory;
use crate::constants::{DATABASES_ENDPOINT, NOTION_API_PAGE_SIZE, SEARCH_ENDPOINT};
use crate::error::AppError;
use crate::model::{RemoteDatabase, RemoteRecord};
use crate::types::{ApiKey, DatabaseId, PropertyId};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use url::Url;

/// Everything tied to one credential.
struct SessionState {
    credential_fingerprint: u64,
    rest: RestClient,
    schemas: SchemaCache,
}

#[derive(Default)]
struct SchemaCache {
    listing: Option<Vec<RemoteDatabase>>,
    by_id: HashMap<DatabaseId, RemoteDatabase>,
}

/// Entry point for all reads against one Notion workspace.
pub struct NotionSession {
    factory: Arc<dyn TransportFactory>,
    base_url: Url,
    state: Mutex<SessionState>,
}

impl NotionSession {
    /// Creates a session bound to `credential`, using `factory` for every
    /// transport it needs.
    pub fn new(
        factory: Arc<dyn TransportFactory>,
        base_url: Url,
        credential: &ApiKey,
    ) -> Result<Self, AppError> {
        let state = bind(factory.as_ref(), &base_url, credential)?;
        Ok(Self {
            factory,
            base_url,
            state: Mutex::new(state),
        })
    }

    /// Creates a session over HTTPS with the given client options.
    pub fn connect(
        base_url: Url,
        options: ClientOptions,
        credential: &ApiKey,
    ) -> Result<Self, AppError> {
        Self::new(
            Arc::new(HttpTransportFactory::new(options)),
            base_url,
            credential,
        )
    }

    /// Lists every database visible to the credential, fetching on first use.
    pub async fn list_databases(&self) -> Result<Vec<RemoteDatabase>, AppError> {
        let mut state = self.state.lock().await;
        if let Some(listing) = &state.schemas.listing {
            log::debug!("Using cached listing of {} databases", listing.len());
            return Ok(listing.clone());
        }

        let payload = json!({"filter": {"value": "database", "property": "object"}});
        let databases = walk_pages::<DatabaseObject, RemoteDatabase>(
            &state.rest,
            SEARCH_ENDPOINT,
            payload_object(payload),
            databases_page,
        )
        .await?;
        log::info!("Found {} databases", databases.len());

        let schemas = &mut state.schemas;
        for database in &databases {
            schemas.by_id.insert(database.id.clone(), database.clone());
        }
        schemas.listing = Some(databases.clone());
        Ok(databases)
    }

    /// Returns the schema of one database, fetching it on a cache miss.
    pub async fn database(&self, id: &DatabaseId) -> Result<RemoteDatabase, AppError> {
        let mut state = self.state.lock().await;
        if let Some(database) = state.schemas.by_id.get(id) {
            return Ok(database.clone());
        }

        let path = format!("{}/{}", DATABASES_ENDPOINT, id.to_hyphenated());
        let object: DatabaseObject = state.rest.get_json(&path).await?;
        let database: RemoteDatabase = object.to_domain()?;
        log::info!("Cached schema of database '{}' ({})", database.name, id);

        state.schemas.by_id.insert(id.clone(), database.clone());
        Ok(database)
    }

    /// Rebinds the session when `credential` differs from the active one.
    ///
    /// Returns `true` when a swap happened. On failure the previous binding
    /// and caches stay in place.
    pub async fn invalidate_on_credential_change(
        &self,
        credential: &ApiKey,
    ) -> Result<bool, AppError> {
        let mut state = self.state.lock().await;
        if state.credential_fingerprint == credential.fingerprint() {
            return Ok(false);
        }

        *state = bind(self.factory.as_ref(), &self.base_url, credential)?;
        log::info!("Credential changed, schema cache cleared");
        Ok(true)
    }

    /// Fetches every record of a database, optionally sorted ascending by one
    /// property.
    pub async fn query_records(
        &self,
        database_id: &DatabaseId,
        sort_by: Option<&PropertyId>,
    ) -> Result<Vec<RemoteRecord>, AppError> {
        let rest = self.state.lock().await.rest.clone();

        let mut payload = Map::new();
        if let Some(property) = sort_by {
            payload.insert(
                "sorts".to_string(),
                json!([{"property": property.as_str(), "direction": "ascending"}]),
            );
        }

        let path = format!(
            "{}/{}/query",
            DATABASES_ENDPOINT,
            database_id.to_hyphenated()
        );
        let records =
            walk_pages::<PageObject, RemoteRecord>(&rest, &path, payload, records_page).await?;
        log::info!("Fetched {} records from {}", records.len(), database_id);
        Ok(records)
    }
}

fn bind(
    factory: &dyn TransportFactory,
    base_url: &Url,
    credential: &ApiKey,
) -> Result<SessionState, AppError> {
    let transport = factory.connect(credential)?;
    Ok(SessionState {
        credential_fingerprint: credential.fingerprint(),
        rest: RestClient::new(transport, base_url.clone()),
        schemas: SchemaCache::default(),
    })
}

fn payload_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// POSTs `payload` to a paginated endpoint and converts every page.
async fn walk_pages<W, T>(
    rest: &RestClient,
    path: &str,
    payload: Map<String, Value>,
    convert: fn(PaginatedResponse<W>) -> Result<PaginatedResponse<T>, AppError>,
) -> Result<Vec<T>, AppError>
where
    W: serde::de::DeserializeOwned,
{
    fetch_all(&payload, NOTION_API_PAGE_SIZE, |page_payload| async move {
        let page: PaginatedResponse<W> = rest.post_json(path, &page_payload).await?;
        convert(page)
    })
    .await
}
