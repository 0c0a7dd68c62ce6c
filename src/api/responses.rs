// src/api/responses.rs
//! Wire-level shapes of Notion API responses.
//!
//! These mirror the JSON just closely enough to decode it; `ToDomain` turns
//! them into the model types the rest of the crate works with.

use crate::constants::UNNAMED_TASK;
use crate::error::AppError;
use crate::model::{
    PropertyData, PropertyDefinition, PropertyKind, PropertyValue, RemoteDatabase, RemoteRecord,
    RichTextSegment,
};
use crate::types::{NotionId, PropertyId};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

/// Generic paginated response wrapper
#[derive(Debug, Clone, Deserialize)]
pub struct PaginatedResponse<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

impl<T> PaginatedResponse<T> {
    /// Converts every result, keeping the cursor fields.
    pub fn try_map<U, F>(self, f: F) -> Result<PaginatedResponse<U>, AppError>
    where
        F: FnMut(T) -> Result<U, AppError>,
    {
        Ok(PaginatedResponse {
            results: self.results.into_iter().map(f).collect::<Result<_, _>>()?,
            next_cursor: self.next_cursor,
            has_more: self.has_more,
        })
    }
}

/// A database object as returned by `search` and `databases/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseObject {
    pub id: String,
    /// Absent title means the database was never named.
    #[serde(default)]
    pub title: Option<Vec<RichTextSegment>>,
    #[serde(default)]
    pub properties: IndexMap<String, PropertySchemaObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PropertySchemaObject {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub number: Option<NumberConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NumberConfig {
    pub format: Option<String>,
}

/// A page (database row). Property values stay raw so one bad value cannot
/// sink the whole page.
#[derive(Debug, Clone, Deserialize)]
pub struct PageObject {
    pub id: String,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub last_edited_time: Option<String>,
    #[serde(default)]
    pub properties: IndexMap<String, Value>,
}

/// Trait for converting wire types to domain types
pub trait ToDomain<T> {
    fn to_domain(self) -> Result<T, AppError>;
}

impl ToDomain<RemoteDatabase> for DatabaseObject {
    fn to_domain(self) -> Result<RemoteDatabase, AppError> {
        let id = NotionId::parse(&self.id)?;
        let name = match self.title {
            Some(segments) if !segments.is_empty() => segments
                .iter()
                .filter_map(|s| s.plain_text.as_deref())
                .collect::<String>(),
            _ => UNNAMED_TASK.to_string(),
        };

        let properties = self
            .properties
            .into_values()
            .map(|schema| {
                let definition = PropertyDefinition {
                    id: PropertyId::from_api(schema.id),
                    name: schema.name,
                    kind: PropertyKind::from_tag(&schema.kind),
                    number_format: schema.number.and_then(|n| n.format),
                };
                (definition.id.clone(), definition)
            })
            .collect();

        Ok(RemoteDatabase {
            id,
            name,
            properties,
        })
    }
}

impl ToDomain<RemoteRecord> for PageObject {
    fn to_domain(self) -> Result<RemoteRecord, AppError> {
        let id = NotionId::parse(&self.id)?;
        let properties = self
            .properties
            .into_iter()
            .filter_map(|(name, raw)| decode_property(&id, name, raw))
            .map(|value| (value.id.clone(), value))
            .collect();

        Ok(RemoteRecord {
            id,
            created_time: self.created_time,
            last_edited_time: self.last_edited_time,
            properties,
        })
    }
}

/// Decodes one property value, degrading to `Unsupported` when its type is
/// unknown or its payload does not match the type.
fn decode_property(record_id: &NotionId, name: String, raw: Value) -> Option<PropertyValue> {
    let Some(id) = raw.get("id").and_then(Value::as_str).map(str::to_string) else {
        log::warn!("record {}: property '{}' has no id, skipping", record_id, name);
        return None;
    };
    let type_tag = raw
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();

    let data = match serde_json::from_value::<PropertyData>(raw) {
        Ok(data) => data,
        Err(e) => {
            if matches!(PropertyKind::from_tag(&type_tag), PropertyKind::Other(_)) {
                log::debug!(
                    "record {}: property '{}' has untranslated type {}",
                    record_id,
                    name,
                    type_tag
                );
            } else {
                log::warn!(
                    "record {}: could not decode {} property '{}': {}",
                    record_id,
                    type_tag,
                    name,
                    e
                );
            }
            PropertyData::Unsupported { type_tag }
        }
    };

    Some(PropertyValue {
        id: PropertyId::from_api(id),
        name,
        data,
    })
}
