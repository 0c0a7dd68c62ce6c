use crate::types::{DatabaseId, PropertyId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a database property.
///
/// Types the translator never reads are kept by name in `Other` so the
/// schema still lists them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    Title,
    RichText,
    Date,
    People,
    Email,
    Number,
    Select,
    MultiSelect,
    CreatedTime,
    LastEditedTime,
    Other(String),
}

impl PropertyKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "title" => Self::Title,
            "rich_text" => Self::RichText,
            "date" => Self::Date,
            "people" => Self::People,
            "email" => Self::Email,
            "number" => Self::Number,
            "select" => Self::Select,
            "multi_select" => Self::MultiSelect,
            "created_time" => Self::CreatedTime,
            "last_edited_time" => Self::LastEditedTime,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the Notion API type name.
    pub fn tag(&self) -> &str {
        match self {
            Self::Title => "title",
            Self::RichText => "rich_text",
            Self::Date => "date",
            Self::People => "people",
            Self::Email => "email",
            Self::Number => "number",
            Self::Select => "select",
            Self::MultiSelect => "multi_select",
            Self::CreatedTime => "created_time",
            Self::LastEditedTime => "last_edited_time",
            Self::Other(tag) => tag,
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Serialize for PropertyKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for PropertyKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::from_tag(&tag))
    }
}

/// One column of a database schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    pub id: PropertyId,
    pub name: String,
    pub kind: PropertyKind,
    /// Display format of `number` properties (`percent`, `dollar`, ...).
    pub number_format: Option<String>,
}

impl PropertyDefinition {
    /// Percent-formatted numbers hold fractions: 0.5 means 50%.
    pub fn is_percent(&self) -> bool {
        self.kind == PropertyKind::Number && self.number_format.as_deref() == Some("percent")
    }
}

/// A Notion database and its schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteDatabase {
    pub id: DatabaseId,
    pub name: String,
    /// Keyed by property ID, in the order the API listed them.
    pub properties: IndexMap<PropertyId, PropertyDefinition>,
}

impl RemoteDatabase {
    pub fn property(&self, id: &PropertyId) -> Option<&PropertyDefinition> {
        self.properties.get(id)
    }
}

/// Orders databases by display name, ignoring case.
pub fn sorted_by_name(databases: &[RemoteDatabase]) -> Vec<RemoteDatabase> {
    let mut sorted = databases.to_vec();
    sorted.sort_by_key(|db| db.name.to_lowercase());
    sorted
}
