// src/api/parser.rs
//! Body decoding for Notion API responses.

use super::responses::{DatabaseObject, PageObject, PaginatedResponse, ToDomain};
use crate::error::{preview, AppError};
use crate::model::{RemoteDatabase, RemoteRecord};
use serde::de::DeserializeOwned;

/// Decodes a successful response body, logging a preview on failure.
pub fn decode_body<T>(body: &str, url: &str) -> Result<T, AppError>
where
    T: DeserializeOwned,
{
    serde_json::from_str(body).map_err(|e| {
        log::error!("Failed to parse response from {}: {}", url, e);
        AppError::MalformedResponse(format!(
            "{} from {} (body: {})",
            e,
            url,
            preview(body).unwrap_or_default()
        ))
    })
}

/// Parses a single database object.
pub fn parse_database(body: &str) -> Result<RemoteDatabase, AppError> {
    let database: DatabaseObject = decode_body(body, "database")?;
    database.to_domain()
}

/// Parses a single page object into a record.
pub fn parse_record(body: &str) -> Result<RemoteRecord, AppError> {
    let page: PageObject = decode_body(body, "page")?;
    page.to_domain()
}

/// Converts one page of `search` results.
pub fn databases_page(
    page: PaginatedResponse<DatabaseObject>,
) -> Result<PaginatedResponse<RemoteDatabase>, AppError> {
    page.try_map(ToDomain::to_domain)
}

/// Converts one page of `databases/{id}/query` results.
pub fn records_page(
    page: PaginatedResponse<PageObject>,
) -> Result<PaginatedResponse<RemoteRecord>, AppError> {
    page.try_map(ToDomain::to_domain)
}
