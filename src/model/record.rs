use super::PropertyKind;
use crate::types::{PropertyId, RecordId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One row of a database.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRecord {
    pub id: RecordId,
    pub created_time: Option<String>,
    pub last_edited_time: Option<String>,
    /// Keyed by property ID, in the order the API listed them.
    pub properties: IndexMap<PropertyId, PropertyValue>,
}

impl RemoteRecord {
    pub fn property(&self, id: &PropertyId) -> Option<&PropertyValue> {
        self.properties.get(id)
    }
}

/// A property value together with the property it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyValue {
    pub id: PropertyId,
    pub name: String,
    pub data: PropertyData,
}

impl PropertyValue {
    pub fn kind(&self) -> PropertyKind {
        self.data.kind()
    }
}

/// The typed payload of a property value, selected by the `type` tag.
///
/// Date and timestamp strings are kept raw; parsing happens during
/// translation where a bad value can be dropped on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyData {
    Title {
        #[serde(default)]
        title: Vec<RichTextSegment>,
    },
    RichText {
        #[serde(default)]
        rich_text: Vec<RichTextSegment>,
    },
    Date {
        date: Option<DateRange>,
    },
    Number {
        number: Option<f64>,
    },
    People {
        #[serde(default)]
        people: Vec<PersonRef>,
    },
    Email {
        email: Option<String>,
    },
    Select {
        select: Option<SelectOption>,
    },
    MultiSelect {
        #[serde(default)]
        multi_select: Vec<SelectOption>,
    },
    CreatedTime {
        created_time: Option<String>,
    },
    LastEditedTime {
        last_edited_time: Option<String>,
    },
    /// Any type the crate does not translate, or a value it could not decode.
    #[serde(skip)]
    Unsupported { type_tag: String },
}

impl PropertyData {
    pub fn kind(&self) -> PropertyKind {
        match self {
            Self::Title { .. } => PropertyKind::Title,
            Self::RichText { .. } => PropertyKind::RichText,
            Self::Date { .. } => PropertyKind::Date,
            Self::Number { .. } => PropertyKind::Number,
            Self::People { .. } => PropertyKind::People,
            Self::Email { .. } => PropertyKind::Email,
            Self::Select { .. } => PropertyKind::Select,
            Self::MultiSelect { .. } => PropertyKind::MultiSelect,
            Self::CreatedTime { .. } => PropertyKind::CreatedTime,
            Self::LastEditedTime { .. } => PropertyKind::LastEditedTime,
            Self::Unsupported { type_tag } => PropertyKind::Other(type_tag.clone()),
        }
    }
}

/// A rich text run; only its plain text matters here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextSegment {
    pub plain_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// A user referenced by a `people` property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRef {
    pub id: Option<String>,
    pub name: Option<String>,
    pub person: Option<PersonDetails>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonDetails {
    pub email: Option<String>,
}

impl PersonRef {
    /// Bots and guests without a shared address have no email.
    pub fn email(&self) -> Option<&str> {
        self.person.as_ref().and_then(|p| p.email.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub id: Option<String>,
    pub name: String,
    pub color: Option<String>,
}
