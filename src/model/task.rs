use crate::types::{RecordId, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Progress state of a task, derived from its percent complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Ready,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn from_percent(percent_complete: f64) -> Self {
        if percent_complete <= 0.0 {
            Self::Ready
        } else if percent_complete < 100.0 {
            Self::InProgress
        } else {
            Self::Completed
        }
    }
}

/// Effort booked against a task, for one resource or unassigned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskActuals {
    pub resource: Option<UserId>,
    pub actual_effort: f64,
    pub percent_complete: f64,
    pub scheduled_start: Option<DateTime<Utc>>,
    pub scheduled_finish: Option<DateTime<Utc>>,
}

/// A database record translated into the target task schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedTask {
    /// ID of the source record, kept for traceability.
    pub id: RecordId,
    pub name: String,
    pub status: TaskStatus,
    pub scheduled_start: Option<DateTime<Utc>>,
    pub scheduled_finish: Option<DateTime<Utc>>,
    /// Between 0 and 100 inclusive.
    pub percent_complete: f64,
    pub actual_effort: f64,
    pub resources: Vec<UserId>,
    pub actuals: Vec<TaskActuals>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_follows_percent_thresholds() {
        assert_eq!(TaskStatus::from_percent(0.0), TaskStatus::Ready);
        assert_eq!(TaskStatus::from_percent(1.0), TaskStatus::InProgress);
        assert_eq!(TaskStatus::from_percent(99.0), TaskStatus::InProgress);
        assert_eq!(TaskStatus::from_percent(100.0), TaskStatus::Completed);
    }

    #[test]
    fn status_serializes_in_upper_snake_case() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
    }
}
