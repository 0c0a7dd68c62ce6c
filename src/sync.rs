// src/sync.rs
//! Work-plan sync: one database in, normalized tasks out.

use crate::api::NotionSession;
use crate::error::{report_warning, AppError, TranslationWarning};
use crate::materialize::materialize;
use crate::model::{FieldMapping, NormalizedTask, RemoteDatabase};
use crate::translate::UserDirectory;
use crate::types::{ApiKey, DatabaseId};
use serde::Serialize;

/// What to sync and how its columns map onto task fields.
#[derive(Debug, Clone)]
pub struct SyncRequest {
    pub database_id: DatabaseId,
    pub mapping: FieldMapping,
}

/// The outcome of a sync: tasks in query order plus every warning raised.
#[derive(Debug, Clone, Serialize)]
pub struct WorkPlan {
    pub database_id: DatabaseId,
    pub tasks: Vec<NormalizedTask>,
    pub warnings: Vec<TranslationWarning>,
}

/// Fetches every record of the requested database and materializes it.
///
/// The session is rebound first if `credential` is not the one it holds, so
/// a schema cached for another credential is never used.
pub async fn sync_work_plan(
    session: &NotionSession,
    credential: &ApiKey,
    request: &SyncRequest,
    directory: &dyn UserDirectory,
) -> Result<WorkPlan, AppError> {
    session.invalidate_on_credential_change(credential).await?;

    let database = session.database(&request.database_id).await?;
    let mut warnings = Vec::new();
    check_mapping(&database, &request.mapping, &mut warnings);

    let sort_by = request.mapping.sort_by.as_ref().map(|p| &p.id);
    let records = session
        .query_records(&request.database_id, sort_by)
        .await?;

    let tasks: Vec<NormalizedTask> = records
        .iter()
        .map(|record| materialize(record, &request.mapping, directory, &mut warnings))
        .collect();

    log::info!(
        "Synced {} tasks from '{}' with {} warning(s)",
        tasks.len(),
        database.name,
        warnings.len()
    );
    Ok(WorkPlan {
        database_id: request.database_id.clone(),
        tasks,
        warnings,
    })
}

/// Warns about mapped properties the schema does not have.
fn check_mapping(
    database: &RemoteDatabase,
    mapping: &FieldMapping,
    warnings: &mut Vec<TranslationWarning>,
) {
    for (field, property) in mapping.assignments() {
        if database.property(&property.id).is_none() {
            report_warning(
                warnings,
                TranslationWarning::UnknownProperty {
                    database_id: database.id.clone(),
                    property_id: property.id.clone(),
                    field: field.label().to_string(),
                },
            );
        }
    }
}
