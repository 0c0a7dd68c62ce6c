//! Property translation: typed values out of dynamically typed properties.
//!
//! Every extraction is total. A property that is missing yields `None`
//! quietly; a property that exists but cannot produce the requested kind of
//! value yields `None` and a [`TranslationWarning`], so one odd column never
//! stops a sync.

mod dates;
mod people;

pub use dates::parse_notion_date;
pub use people::{split_email_list, DirectoryEntry, InMemoryDirectory, UserDirectory};

use crate::error::{report_warning, TranslationWarning, ValueKind};
use crate::model::{PersonRef, PropertyData, PropertyRef, PropertyValue, RemoteRecord, RichTextSegment};
use crate::types::{RecordId, UserId};
use chrono::{DateTime, Utc};

/// A value extracted from one property.
#[derive(Debug, Clone, PartialEq)]
pub enum TranslatedValue {
    Text(String),
    Date(DateTime<Utc>),
    Number(f64),
    People(Vec<UserId>),
}

/// Extracts typed values from records, resolving people through a directory.
pub struct PropertyTranslator<'a> {
    directory: &'a dyn UserDirectory,
}

impl<'a> PropertyTranslator<'a> {
    pub fn new(directory: &'a dyn UserDirectory) -> Self {
        Self { directory }
    }

    /// Extracts `kind` from the property `property` of `record`.
    pub fn translate(
        &self,
        record: &RemoteRecord,
        property: &PropertyRef,
        kind: ValueKind,
        warnings: &mut Vec<TranslationWarning>,
    ) -> Option<TranslatedValue> {
        let value = record.property(&property.id)?;
        let site = Site {
            record_id: &record.id,
            value,
        };

        if property.is_end() && !matches!(value.data, PropertyData::Date { .. }) {
            site.mismatch(kind, warnings);
            return None;
        }

        match (kind, &value.data) {
            (ValueKind::Text, PropertyData::Title { title: segments })
            | (ValueKind::Text, PropertyData::RichText { rich_text: segments }) => {
                Some(TranslatedValue::Text(concat_plain_text(segments)))
            }

            (ValueKind::Date, PropertyData::Date { date }) => {
                let raw = date.as_ref().and_then(|range| {
                    if property.is_end() {
                        range.end.as_deref()
                    } else {
                        range.start.as_deref()
                    }
                });
                site.date(raw, warnings)
            }
            (ValueKind::Date, PropertyData::CreatedTime { created_time: raw })
            | (ValueKind::Date, PropertyData::LastEditedTime { last_edited_time: raw }) => {
                site.date(raw.as_deref(), warnings)
            }

            (ValueKind::Number, PropertyData::Number { number }) => {
                number.map(TranslatedValue::Number)
            }

            (ValueKind::People, PropertyData::Email { email }) => {
                let references = email.as_deref().map(split_email_list).unwrap_or_default();
                let ids = references
                    .into_iter()
                    .filter_map(|reference| self.resolve(&site, reference, warnings));
                Some(TranslatedValue::People(dedup_in_order(ids)))
            }
            (ValueKind::People, PropertyData::People { people }) => {
                let ids = people
                    .iter()
                    .filter_map(|person| self.resolve_person(&site, person, warnings));
                Some(TranslatedValue::People(dedup_in_order(ids)))
            }

            _ => {
                site.mismatch(kind, warnings);
                None
            }
        }
    }

    pub fn text(
        &self,
        record: &RemoteRecord,
        property: &PropertyRef,
        warnings: &mut Vec<TranslationWarning>,
    ) -> Option<String> {
        match self.translate(record, property, ValueKind::Text, warnings)? {
            TranslatedValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn date(
        &self,
        record: &RemoteRecord,
        property: &PropertyRef,
        warnings: &mut Vec<TranslationWarning>,
    ) -> Option<DateTime<Utc>> {
        match self.translate(record, property, ValueKind::Date, warnings)? {
            TranslatedValue::Date(date) => Some(date),
            _ => None,
        }
    }

    pub fn number(
        &self,
        record: &RemoteRecord,
        property: &PropertyRef,
        warnings: &mut Vec<TranslationWarning>,
    ) -> Option<f64> {
        match self.translate(record, property, ValueKind::Number, warnings)? {
            TranslatedValue::Number(number) => Some(number),
            _ => None,
        }
    }

    pub fn people(
        &self,
        record: &RemoteRecord,
        property: &PropertyRef,
        warnings: &mut Vec<TranslationWarning>,
    ) -> Option<Vec<UserId>> {
        match self.translate(record, property, ValueKind::People, warnings)? {
            TranslatedValue::People(ids) => Some(ids),
            _ => None,
        }
    }

    fn resolve(
        &self,
        site: &Site<'_>,
        reference: &str,
        warnings: &mut Vec<TranslationWarning>,
    ) -> Option<UserId> {
        let resolved = self.directory.resolve(reference);
        if resolved.is_none() {
            report_warning(
                warnings,
                TranslationWarning::UnresolvedIdentity {
                    record_id: site.record_id.clone(),
                    property_id: site.value.id.clone(),
                    reference: reference.to_string(),
                },
            );
        }
        resolved
    }

    /// Embedded email first, display name second.
    fn resolve_person(
        &self,
        site: &Site<'_>,
        person: &PersonRef,
        warnings: &mut Vec<TranslationWarning>,
    ) -> Option<UserId> {
        let email = person.email().map(str::trim).filter(|e| !e.is_empty());
        let name = person.name.as_deref().map(str::trim).filter(|n| !n.is_empty());

        if let Some(id) = email.and_then(|e| self.directory.resolve(e)) {
            return Some(id);
        }
        match (name, email) {
            (Some(name), _) => self.resolve(site, name, warnings),
            (None, Some(email)) => self.resolve(site, email, warnings),
            (None, None) => {
                let reference = person.id.clone().unwrap_or_else(|| "unnamed user".to_string());
                self.resolve(site, &reference, warnings)
            }
        }
    }
}

/// The record and property a translation is working on.
struct Site<'r> {
    record_id: &'r RecordId,
    value: &'r PropertyValue,
}

impl Site<'_> {
    fn mismatch(&self, requested: ValueKind, warnings: &mut Vec<TranslationWarning>) {
        report_warning(
            warnings,
            TranslationWarning::UnsupportedExtraction {
                record_id: self.record_id.clone(),
                property_id: self.value.id.clone(),
                property_type: self.value.kind().to_string(),
                requested,
            },
        );
    }

    fn date(
        &self,
        raw: Option<&str>,
        warnings: &mut Vec<TranslationWarning>,
    ) -> Option<TranslatedValue> {
        let raw = raw.map(str::trim).filter(|r| !r.is_empty())?;
        match parse_notion_date(raw) {
            Some(date) => Some(TranslatedValue::Date(date)),
            None => {
                report_warning(
                    warnings,
                    TranslationWarning::UnparseableDate {
                        record_id: self.record_id.clone(),
                        property_id: self.value.id.clone(),
                        raw: raw.to_string(),
                    },
                );
                None
            }
        }
    }
}

fn concat_plain_text(segments: &[RichTextSegment]) -> String {
    segments
        .iter()
        .filter_map(|segment| segment.plain_text.as_deref())
        .collect()
}

fn dedup_in_order(ids: impl Iterator<Item = UserId>) -> Vec<UserId> {
    let mut unique = Vec::new();
    for id in ids {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::parser::parse_record;
    use crate::types::PropertyId;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record() -> RemoteRecord {
        let body = json!({
            "id": "59833787-2cf9-4fdf-8782-e53db20768a5",
            "created_time": "2023-01-05T09:00:00.000Z",
            "properties": {
                "Name": {"id": "title", "type": "title", "title": [
                    {"plain_text": "Ship "}, {"plain_text": "it"}
                ]},
                "Notes": {"id": "notes", "type": "rich_text", "rich_text": []},
                "When": {"id": "when", "type": "date", "date": {
                    "start": "2021-05-01", "end": "2021-05-03T10:00:00+02:00"
                }},
                "Bad date": {"id": "bad", "type": "date", "date": {"start": "not-a-date"}},
                "Created": {"id": "created", "type": "created_time", "created_time": "2023-01-05T09:00:00.000Z"},
                "Progress": {"id": "progress", "type": "number", "number": 0.5},
                "Empty number": {"id": "nothing", "type": "number", "number": null},
                "Contacts": {"id": "contacts", "type": "email", "email": "a@x.com;b@x.com,a@x.com; ghost@x.com"},
                "Owners": {"id": "owners", "type": "people", "people": [
                    {"id": "u1", "name": "Someone Else", "person": {"email": "b@x.com"}},
                    {"id": "u2", "name": "carol"},
                    {"id": "u3", "name": "Ada", "person": {"email": "unknown@x.com"}},
                    {"id": "u4", "name": "Bot"}
                ]},
                "Stage": {"id": "stage", "type": "select", "select": {"name": "Doing"}}
            }
        });
        parse_record(&body.to_string()).unwrap()
    }

    fn directory() -> InMemoryDirectory {
        InMemoryDirectory::new(vec![
            DirectoryEntry {
                id: UserId(1),
                email: Some("a@x.com".to_string()),
                username: Some("ada".to_string()),
            },
            DirectoryEntry {
                id: UserId(2),
                email: Some("b@x.com".to_string()),
                username: None,
            },
            DirectoryEntry {
                id: UserId(3),
                email: None,
                username: Some("carol".to_string()),
            },
        ])
    }

    fn prop(raw: &str) -> PropertyRef {
        PropertyRef::parse(raw).unwrap()
    }

    #[test]
    fn text_concatenates_title_and_rich_text() {
        let dir = directory();
        let translator = PropertyTranslator::new(&dir);
        let mut warnings = Vec::new();
        let record = record();

        assert_eq!(
            translator.text(&record, &prop("title"), &mut warnings),
            Some("Ship it".to_string())
        );
        assert_eq!(
            translator.text(&record, &prop("notes"), &mut warnings),
            Some(String::new())
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn dates_read_start_end_and_timestamps() {
        let dir = directory();
        let translator = PropertyTranslator::new(&dir);
        let mut warnings = Vec::new();
        let record = record();

        let start = translator.date(&record, &prop("when"), &mut warnings).unwrap();
        assert_eq!(start.to_rfc3339(), "2021-05-01T00:00:00+00:00");
        let end = translator.date(&record, &prop("when#end"), &mut warnings).unwrap();
        assert_eq!(end.to_rfc3339(), "2021-05-03T08:00:00+00:00");
        let created = translator.date(&record, &prop("created"), &mut warnings).unwrap();
        assert_eq!(created.to_rfc3339(), "2023-01-05T09:00:00+00:00");
        assert!(warnings.is_empty());
    }

    #[test]
    fn unparseable_date_warns_and_yields_none() {
        let dir = directory();
        let translator = PropertyTranslator::new(&dir);
        let mut warnings = Vec::new();

        assert_eq!(translator.date(&record(), &prop("bad"), &mut warnings), None);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            &warnings[0],
            TranslationWarning::UnparseableDate { raw, .. } if raw == "not-a-date"
        ));
    }

    #[test]
    fn numbers_are_raw_and_null_is_absent() {
        let dir = directory();
        let translator = PropertyTranslator::new(&dir);
        let mut warnings = Vec::new();
        let record = record();

        assert_eq!(translator.number(&record, &prop("progress"), &mut warnings), Some(0.5));
        assert_eq!(translator.number(&record, &prop("nothing"), &mut warnings), None);
        assert!(warnings.is_empty());
    }

    #[test]
    fn email_list_resolves_dedups_and_skips_unknown() {
        let dir = directory();
        let translator = PropertyTranslator::new(&dir);
        let mut warnings = Vec::new();

        let ids = translator.people(&record(), &prop("contacts"), &mut warnings);
        assert_eq!(ids, Some(vec![UserId(1), UserId(2)]));
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            &warnings[0],
            TranslationWarning::UnresolvedIdentity { reference, .. } if reference == "ghost@x.com"
        ));
    }

    #[test]
    fn people_resolve_by_email_then_name() {
        let dir = directory();
        let translator = PropertyTranslator::new(&dir);
        let mut warnings = Vec::new();

        let ids = translator.people(&record(), &prop("owners"), &mut warnings);
        // u1 by email, carol by username, Ada falls back to her name.
        assert_eq!(ids, Some(vec![UserId(2), UserId(3), UserId(1)]));
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            &warnings[0],
            TranslationWarning::UnresolvedIdentity { reference, .. } if reference == "Bot"
        ));
    }

    #[test]
    fn absent_property_is_silent() {
        let dir = directory();
        let translator = PropertyTranslator::new(&dir);
        let mut warnings = Vec::new();

        let missing = PropertyRef::start(PropertyId::new("missing").unwrap());
        assert_eq!(translator.text(&record(), &missing, &mut warnings), None);
        assert!(warnings.is_empty());
    }

    #[test]
    fn kind_mismatch_warns() {
        let dir = directory();
        let translator = PropertyTranslator::new(&dir);
        let mut warnings = Vec::new();
        let record = record();

        assert_eq!(translator.number(&record, &prop("title"), &mut warnings), None);
        assert_eq!(translator.text(&record, &prop("stage"), &mut warnings), None);
        assert_eq!(translator.text(&record, &prop("title#end"), &mut warnings), None);
        assert_eq!(warnings.len(), 3);
        assert_eq!(
            warnings[1],
            TranslationWarning::UnsupportedExtraction {
                record_id: record.id.clone(),
                property_id: PropertyId::new("stage").unwrap(),
                property_type: "select".to_string(),
                requested: ValueKind::Text,
            }
        );
    }
}
