//! Read models for boundary serialization.
//!
//! # Responsibility
//! - Shape entities into the representations a boundary layer serializes:
//!   embedded category summary, subtask list, derived flags, progress tally.
//!
//! # Invariants
//! - `is_completed`/`is_overdue` are computed from the entity, never stored.
//! - `subtask_progress` is absent (not zeroed) when a task has no subtasks.

use crate::model::category::{Category, CategoryId};
use crate::model::subtask::{Subtask, SubtaskId};
use crate::model::task::{Task, TaskId, TaskPriority, TaskStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Completed/total tally for a task's checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubtaskProgress {
    pub completed: u32,
    pub total: u32,
}

/// Subtask wire shape; `sort_order` serializes as `order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtaskView {
    pub id: SubtaskId,
    pub title: String,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(rename = "order")]
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&Subtask> for SubtaskView {
    fn from(subtask: &Subtask) -> Self {
        Self {
            id: subtask.uuid,
            title: subtask.title.clone(),
            is_completed: subtask.is_completed,
            completed_at: subtask.completed_at,
            sort_order: subtask.sort_order,
            created_at: subtask.created_at,
        }
    }
}

/// Category summary embedded in task representations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub id: CategoryId,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub task_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CategorySummary {
    pub fn new(category: &Category, task_count: u64) -> Self {
        Self {
            id: category.uuid,
            name: category.name.clone(),
            icon: category.icon.clone(),
            color: category.color.clone(),
            task_count,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

/// Full task representation with embedded relations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskDetail {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<CategoryId>,
    pub category_details: Option<CategorySummary>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_completed: bool,
    pub is_overdue: bool,
    pub subtasks: Vec<SubtaskView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtask_progress: Option<SubtaskProgress>,
}

impl TaskDetail {
    /// Assembles the representation from already-loaded relations.
    pub fn from_parts(
        task: &Task,
        category_details: Option<CategorySummary>,
        subtasks: &[Subtask],
    ) -> Self {
        Self {
            id: task.uuid,
            title: task.title.clone(),
            description: task.description.clone(),
            category: task.category_id,
            category_details,
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
            completed_at: task.completed_at,
            created_at: task.created_at,
            updated_at: task.updated_at,
            is_completed: task.is_completed(),
            is_overdue: task.is_overdue(),
            subtasks: subtasks.iter().map(SubtaskView::from).collect(),
            subtask_progress: subtask_progress(subtasks),
        }
    }
}

/// Aggregate status tally returned by the statistics endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskStatistics {
    pub total: u64,
    pub pending: u64,
    pub in_progress: u64,
    pub completed: u64,
}

fn subtask_progress(subtasks: &[Subtask]) -> Option<SubtaskProgress> {
    if subtasks.is_empty() {
        return None;
    }
    let completed = subtasks.iter().filter(|s| s.is_completed).count() as u32;
    Some(SubtaskProgress {
        completed,
        total: subtasks.len() as u32,
    })
}
