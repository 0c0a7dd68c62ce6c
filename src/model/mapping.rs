//! Field mapping: which database property feeds which task field.

use super::{PropertyDefinition, PropertyKind, RemoteDatabase};
use crate::constants::END_DATE_SUFFIX;
use crate::types::{PropertyId, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of a date range a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DateSide {
    #[default]
    Start,
    End,
}

/// A property ID as written in a mapping, optionally suffixed with
/// [`END_DATE_SUFFIX`] to select the end of a date range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PropertyRef {
    pub id: PropertyId,
    pub side: DateSide,
}

impl PropertyRef {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let raw = raw.trim();
        let (id, side) = match raw.strip_suffix(END_DATE_SUFFIX) {
            Some(base) => (base, DateSide::End),
            None => (raw, DateSide::Start),
        };
        let id = PropertyId::new(id)
            .map_err(|_| ValidationError::InvalidPropertyRef(raw.to_string()))?;
        Ok(Self { id, side })
    }

    pub fn start(id: PropertyId) -> Self {
        Self {
            id,
            side: DateSide::Start,
        }
    }

    pub fn end(id: PropertyId) -> Self {
        Self {
            id,
            side: DateSide::End,
        }
    }

    pub fn is_end(&self) -> bool {
        self.side == DateSide::End
    }
}

impl fmt::Display for PropertyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.side {
            DateSide::Start => write!(f, "{}", self.id),
            DateSide::End => write!(f, "{}{}", self.id, END_DATE_SUFFIX),
        }
    }
}

impl TryFrom<String> for PropertyRef {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PropertyRef> for String {
    fn from(value: PropertyRef) -> Self {
        value.to_string()
    }
}

/// Logical task fields a property can be mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetField {
    Name,
    StartDate,
    FinishDate,
    Resources,
    PercentComplete,
    ActualEffort,
    SortBy,
}

impl TargetField {
    pub const ALL: [TargetField; 7] = [
        Self::Name,
        Self::StartDate,
        Self::FinishDate,
        Self::Resources,
        Self::PercentComplete,
        Self::ActualEffort,
        Self::SortBy,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::StartDate => "start date",
            Self::FinishDate => "finish date",
            Self::Resources => "resources",
            Self::PercentComplete => "percent complete",
            Self::ActualEffort => "actual effort",
            Self::SortBy => "sort by",
        }
    }

    /// Whether a property of this definition can feed the field.
    pub fn accepts(&self, property: &PropertyDefinition) -> bool {
        match self {
            Self::Name => matches!(property.kind, PropertyKind::Title | PropertyKind::RichText),
            Self::StartDate | Self::FinishDate => {
                matches!(property.kind, PropertyKind::Date | PropertyKind::CreatedTime)
            }
            Self::Resources => matches!(property.kind, PropertyKind::People | PropertyKind::Email),
            Self::PercentComplete => property.is_percent(),
            Self::ActualEffort => property.kind == PropertyKind::Number,
            Self::SortBy => true,
        }
    }
}

impl fmt::Display for TargetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Maps each task field to the property it is read from.
///
/// Unset fields fall back to the task defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldMapping {
    pub name: Option<PropertyRef>,
    pub start_date: Option<PropertyRef>,
    pub finish_date: Option<PropertyRef>,
    pub resources: Option<PropertyRef>,
    pub percent_complete: Option<PropertyRef>,
    pub actual_effort: Option<PropertyRef>,
    pub sort_by: Option<PropertyRef>,
}

impl FieldMapping {
    pub fn get(&self, field: TargetField) -> Option<&PropertyRef> {
        match field {
            TargetField::Name => self.name.as_ref(),
            TargetField::StartDate => self.start_date.as_ref(),
            TargetField::FinishDate => self.finish_date.as_ref(),
            TargetField::Resources => self.resources.as_ref(),
            TargetField::PercentComplete => self.percent_complete.as_ref(),
            TargetField::ActualEffort => self.actual_effort.as_ref(),
            TargetField::SortBy => self.sort_by.as_ref(),
        }
    }

    /// All configured fields, in declaration order.
    pub fn assignments(&self) -> Vec<(TargetField, &PropertyRef)> {
        TargetField::ALL
            .iter()
            .filter_map(|field| self.get(*field).map(|property| (*field, property)))
            .collect()
    }

    /// Fields set in `overrides` replace the ones in `self`.
    pub fn overridden_by(self, overrides: FieldMapping) -> FieldMapping {
        FieldMapping {
            name: overrides.name.or(self.name),
            start_date: overrides.start_date.or(self.start_date),
            finish_date: overrides.finish_date.or(self.finish_date),
            resources: overrides.resources.or(self.resources),
            percent_complete: overrides.percent_complete.or(self.percent_complete),
            actual_effort: overrides.actual_effort.or(self.actual_effort),
            sort_by: overrides.sort_by.or(self.sort_by),
        }
    }
}

/// A property that may be picked for a target field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappingCandidate {
    pub property: PropertyRef,
    pub label: String,
}

/// Lists the properties of `database` compatible with `field`.
///
/// Date properties are offered twice: once as-is and once for the end of
/// their range.
pub fn mapping_candidates(database: &RemoteDatabase, field: TargetField) -> Vec<MappingCandidate> {
    let mut candidates = Vec::new();
    for property in database.properties.values().filter(|p| field.accepts(p)) {
        candidates.push(MappingCandidate {
            property: PropertyRef::start(property.id.clone()),
            label: property.name.clone(),
        });
        if property.kind == PropertyKind::Date {
            candidates.push(MappingCandidate {
                property: PropertyRef::end(property.id.clone()),
                label: format!("{} (end date)", property.name),
            });
        }
    }
    candidates
}
