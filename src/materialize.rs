// src/materialize.rs
//! Turns one database record into a normalized task.

use crate::constants::{MINIMAL_PROGRESS, UNNAMED_TASK};
use crate::error::TranslationWarning;
use crate::model::{FieldMapping, NormalizedTask, RemoteRecord, TaskActuals, TaskStatus};
use crate::translate::{PropertyTranslator, UserDirectory};
use crate::types::UserId;
use chrono::{DateTime, Utc};

/// Builds a task from `record` according to `mapping`.
///
/// Unmapped or empty fields fall back to defaults: name `"?"`, no dates, no
/// resources, zero progress and effort. Non-fatal problems are appended to
/// `warnings`.
pub fn materialize(
    record: &RemoteRecord,
    mapping: &FieldMapping,
    directory: &dyn UserDirectory,
    warnings: &mut Vec<TranslationWarning>,
) -> NormalizedTask {
    let translator = PropertyTranslator::new(directory);

    let name = mapping
        .name
        .as_ref()
        .and_then(|p| translator.text(record, p, warnings))
        .unwrap_or_else(|| UNNAMED_TASK.to_string());
    let scheduled_start = mapping
        .start_date
        .as_ref()
        .and_then(|p| translator.date(record, p, warnings));
    let scheduled_finish = mapping
        .finish_date
        .as_ref()
        .and_then(|p| translator.date(record, p, warnings));
    let resources = mapping
        .resources
        .as_ref()
        .and_then(|p| translator.people(record, p, warnings))
        .unwrap_or_default();

    let effort = mapping
        .actual_effort
        .as_ref()
        .and_then(|p| translator.number(record, p, warnings))
        .map_or(0.0, |effort| effort.max(0.0));
    // Stored as a fraction, reported out of 100.
    let percent = mapping
        .percent_complete
        .as_ref()
        .and_then(|p| translator.number(record, p, warnings))
        .map_or(0.0, |fraction| (fraction * 100.0).clamp(0.0, 100.0));
    let (percent_complete, actual_effort) = reconcile_progress(percent, effort);

    let actuals = split_actuals(
        &resources,
        actual_effort,
        percent_complete,
        scheduled_start,
        scheduled_finish,
    );

    NormalizedTask {
        id: record.id.clone(),
        name,
        status: TaskStatus::from_percent(percent_complete),
        scheduled_start,
        scheduled_finish,
        percent_complete,
        actual_effort,
        resources,
        actuals,
    }
}

/// Effort without progress or progress without effort reads as a
/// contradiction downstream; each side gets at least the minimal value.
fn reconcile_progress(percent: f64, effort: f64) -> (f64, f64) {
    if effort > 0.0 && percent <= 0.0 {
        (MINIMAL_PROGRESS, effort)
    } else if effort <= 0.0 && percent > 0.0 {
        (percent, MINIMAL_PROGRESS)
    } else {
        (percent, effort)
    }
}

fn split_actuals(
    resources: &[UserId],
    actual_effort: f64,
    percent_complete: f64,
    scheduled_start: Option<DateTime<Utc>>,
    scheduled_finish: Option<DateTime<Utc>>,
) -> Vec<TaskActuals> {
    let entry = |resource: Option<UserId>, actual_effort: f64| TaskActuals {
        resource,
        actual_effort,
        percent_complete,
        scheduled_start,
        scheduled_finish,
    };

    if resources.is_empty() {
        return vec![entry(None, actual_effort)];
    }
    let share = actual_effort / resources.len() as f64;
    resources.iter().map(|id| entry(Some(*id), share)).collect()
}
