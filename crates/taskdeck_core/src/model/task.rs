//! Task domain model.
//!
//! # Responsibility
//! - Define the task record, its status/priority vocabulary and derived state.
//! - Provide the completion transition helpers used by the task service.
//!
//! # Invariants
//! - `completed_at` is `Some` exactly when `status == Completed`.
//! - `user_id` never changes after construction; updates keep the creator.
//! - Cross-entity rules (category ownership) live in the service layer.

use crate::model::category::CategoryId;
use crate::model::{require_text, ValidationError};
use crate::scope::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a task.
pub type TaskId = Uuid;

pub const TASK_TITLE_MAX_CHARS: usize = 255;

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created but not started.
    Pending,
    /// Work has begun.
    InProgress,
    /// Finished; `completed_at` records when.
    Completed,
}

/// Relative importance used for filtering and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

/// A to-do item owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable id used for lookups and subtask linkage.
    pub uuid: TaskId,
    pub title: String,
    pub description: Option<String>,
    /// Optional category; must belong to the same owner when set.
    pub category_id: Option<CategoryId>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    /// Set exactly when `status == Completed`.
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Owning user; immutable after creation.
    pub user_id: UserId,
}

impl Task {
    /// Creates a pending, medium-priority task owned by `user_id`.
    pub fn new(user_id: UserId, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            uuid: Uuid::new_v4(),
            title: title.into(),
            description: None,
            category_id: None,
            status: TaskStatus::Pending,
            priority: TaskPriority::Medium,
            due_date: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
            user_id,
        }
    }

    /// Marks the task completed and stamps `completed_at`.
    ///
    /// Idempotent: re-invoking on a completed task refreshes the timestamp.
    pub fn mark_completed(&mut self) {
        self.status = TaskStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    /// Reverts the task to pending and clears `completed_at`.
    pub fn mark_pending(&mut self) {
        self.status = TaskStatus::Pending;
        self.completed_at = None;
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// A task is overdue when its due date has passed and it is not completed.
    pub fn is_overdue(&self) -> bool {
        match self.due_date {
            Some(due) => !self.is_completed() && due < Utc::now(),
            None => false,
        }
    }

    /// Checks field constraints and the completion invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title, TASK_TITLE_MAX_CHARS)?;
        if self.is_completed() != self.completed_at.is_some() {
            return Err(ValidationError::CompletionMismatch);
        }
        Ok(())
    }

    /// Applies a partial update field by field.
    ///
    /// When the patch moves `status` across the completed boundary,
    /// `completed_at` is adjusted so the completion invariant holds.
    pub fn apply_patch(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(category_id) = patch.category_id {
            self.category_id = category_id;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(status) = patch.status {
            match (self.is_completed(), status == TaskStatus::Completed) {
                (false, true) => self.completed_at = Some(Utc::now()),
                (true, false) => self.completed_at = None,
                _ => {}
            }
            self.status = status;
        }
    }
}

/// Mutable task fields for partial updates.
///
/// Outer `None` leaves a field unchanged; for clearable fields the inner
/// `Option` distinguishes "set to value" from "clear".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub category_id: Option<Option<CategoryId>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<Option<DateTime<Utc>>>,
}

#[cfg(test)]
mod tests {
    use super::{Task, TaskPatch, TaskPriority, TaskStatus};
    use crate::model::ValidationError;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn task(title: &str) -> Task {
        Task::new(Uuid::new_v4(), title)
    }

    #[test]
    fn new_task_defaults_to_pending_medium() {
        let task = task("buy milk");
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert!(task.completed_at.is_none());
        assert!(!task.is_completed());
    }

    #[test]
    fn mark_completed_then_pending_round_trips() {
        let mut task = task("write report");

        task.mark_completed();
        assert!(task.is_completed());
        assert!(task.completed_at.is_some());

        task.mark_pending();
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn mark_completed_is_idempotent() {
        let mut task = task("repeat");
        task.mark_completed();
        let first = task.completed_at;
        task.mark_completed();
        assert!(task.is_completed());
        assert!(task.completed_at >= first);
    }

    #[test]
    fn overdue_requires_past_due_date_and_open_status() {
        let mut task = task("deadline");
        assert!(!task.is_overdue());

        task.due_date = Some(Utc::now() - Duration::hours(1));
        assert!(task.is_overdue());

        task.mark_completed();
        assert!(!task.is_overdue());

        task.mark_pending();
        task.due_date = Some(Utc::now() + Duration::hours(1));
        assert!(!task.is_overdue());
    }

    #[test]
    fn validate_rejects_blank_and_oversized_titles() {
        let blank = task("   ");
        assert_eq!(
            blank.validate().unwrap_err(),
            ValidationError::EmptyField("title")
        );

        let oversized = task(&"x".repeat(256));
        assert!(matches!(
            oversized.validate().unwrap_err(),
            ValidationError::TooLong { field: "title", .. }
        ));
    }

    #[test]
    fn validate_rejects_completion_mismatch() {
        let mut task = task("mismatch");
        task.completed_at = Some(Utc::now());
        assert_eq!(
            task.validate().unwrap_err(),
            ValidationError::CompletionMismatch
        );
    }

    #[test]
    fn patch_status_keeps_completed_at_in_sync() {
        let mut task = task("sync");

        task.apply_patch(&TaskPatch {
            status: Some(TaskStatus::Completed),
            ..TaskPatch::default()
        });
        assert!(task.completed_at.is_some());

        task.apply_patch(&TaskPatch {
            status: Some(TaskStatus::InProgress),
            ..TaskPatch::default()
        });
        assert_eq!(task.status, TaskStatus::InProgress);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn patch_clears_optional_fields_explicitly() {
        let mut task = task("clearable");
        task.description = Some("old".to_string());
        task.due_date = Some(Utc::now());

        task.apply_patch(&TaskPatch {
            description: Some(None),
            due_date: Some(None),
            ..TaskPatch::default()
        });
        assert!(task.description.is_none());
        assert!(task.due_date.is_none());

        // Untouched patch leaves everything as-is.
        let before = task.clone();
        task.apply_patch(&TaskPatch::default());
        assert_eq!(task, before);
    }

    #[test]
    fn status_serializes_as_snake_case() {
        let json = serde_json::to_value(TaskStatus::InProgress).unwrap();
        assert_eq!(json, "in_progress");
        let json = serde_json::to_value(TaskPriority::High).unwrap();
        assert_eq!(json, "high");
    }
}
