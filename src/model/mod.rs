//! Domain model: database schemas, records, field mappings and tasks.

mod database;
pub mod mapping;
mod record;
mod task;

pub use database::{sorted_by_name, PropertyDefinition, PropertyKind, RemoteDatabase};
pub use mapping::{
    mapping_candidates, DateSide, FieldMapping, MappingCandidate, PropertyRef, TargetField,
};
pub use record::{
    DateRange, PersonRef, PropertyData, PropertyValue, RemoteRecord, RichTextSegment,
};
pub use task::{NormalizedTask, TaskActuals, TaskStatus};
