//! Subtask domain model.
//!
//! Subtasks are checklist items inside one task. They have no owner field;
//! their effective owner is the parent task's owner, and storage deletes
//! them together with the task (`ON DELETE CASCADE`).

use crate::model::task::TaskId;
use crate::model::{require_text, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a subtask.
pub type SubtaskId = Uuid;

pub const SUBTASK_TITLE_MAX_CHARS: usize = 255;

/// A checklist item within a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub uuid: SubtaskId,
    /// Parent task; cascade-deleted with it.
    pub task_id: TaskId,
    pub title: String,
    pub is_completed: bool,
    /// Mirrors `is_completed`.
    pub completed_at: Option<DateTime<Utc>>,
    /// Display position within the parent task's checklist.
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
}

impl Subtask {
    pub fn new(task_id: TaskId, title: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            task_id,
            title: title.into(),
            is_completed: false,
            completed_at: None,
            sort_order: 0,
            created_at: Utc::now(),
        }
    }

    /// Flips completion and sets or clears `completed_at` accordingly.
    pub fn toggle(&mut self) {
        self.is_completed = !self.is_completed;
        self.completed_at = self.is_completed.then(Utc::now);
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title, SUBTASK_TITLE_MAX_CHARS)?;
        if self.is_completed != self.completed_at.is_some() {
            return Err(ValidationError::CompletionMismatch);
        }
        Ok(())
    }

    /// Applies a partial update field by field, keeping `completed_at`
    /// mirrored when the patch changes completion.
    pub fn apply_patch(&mut self, patch: &SubtaskPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(sort_order) = patch.sort_order {
            self.sort_order = sort_order;
        }
        if let Some(is_completed) = patch.is_completed {
            if is_completed != self.is_completed {
                self.is_completed = is_completed;
                self.completed_at = is_completed.then(Utc::now);
            }
        }
    }
}

/// Mutable subtask fields for partial updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtaskPatch {
    pub title: Option<String>,
    pub is_completed: Option<bool>,
    pub sort_order: Option<i64>,
}
