// src/api/pagination.rs
//! Cursor pagination without BoxFuture.

use super::responses::PaginatedResponse;
use crate::error::AppError;
use serde_json::{Map, Value};
use std::future::Future;

/// Fetches every page of a paginated POST endpoint.
///
/// Each request is `base_payload` plus `page_size` and, after the first page,
/// the `start_cursor` returned by the previous one. Results are accumulated in
/// server order. Any failing page fails the whole walk; nothing partial is
/// returned.
pub async fn fetch_all<T, F, Fut>(
    base_payload: &Map<String, Value>,
    page_size: u32,
    mut fetch_page: F,
) -> Result<Vec<T>, AppError>
where
    F: FnMut(Value) -> Fut,
    Fut: Future<Output = Result<PaginatedResponse<T>, AppError>>,
{
    let mut all_items = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages_fetched = 0u32;

    loop {
        let payload = page_payload(base_payload, page_size, cursor.as_deref());
        let response = fetch_page(payload).await?;
        pages_fetched += 1;
        all_items.extend(response.results);

        if !response.has_more {
            break;
        }
        match response.next_cursor {
            Some(next) => cursor = Some(next),
            None => {
                return Err(AppError::MalformedResponse(format!(
                    "page {} reports more results but carries no next_cursor",
                    pages_fetched
                )))
            }
        }
    }

    log::debug!(
        "Fetched {} items over {} page(s)",
        all_items.len(),
        pages_fetched
    );
    Ok(all_items)
}

fn page_payload(base: &Map<String, Value>, page_size: u32, cursor: Option<&str>) -> Value {
    let mut payload = base.clone();
    payload.insert("page_size".to_string(), Value::from(page_size));
    if let Some(cursor) = cursor {
        payload.insert("start_cursor".to_string(), Value::from(cursor));
    }
    Value::Object(payload)
}
