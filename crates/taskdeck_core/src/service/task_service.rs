//! Task use-case service.
//!
//! # Responsibility
//! - Orchestrate scoped repository calls for task use-cases.
//! - Hold the cross-entity rules: category ownership on create/update,
//!   completion transitions, statistics, calendar-month grouping.
//!
//! # Invariants
//! - Id-based operations on missing or non-owned ids return `Ok(None)` /
//!   `Ok(false)`; the boundary decides the user-facing error.
//! - Mutations re-read the row after the write so returned entities carry
//!   storage-assigned `updated_at` values.

use crate::model::category::CategoryId;
use crate::model::task::{Task, TaskId, TaskPatch, TaskPriority, TaskStatus};
use crate::repo::category_repo::CategoryRepository;
use crate::repo::subtask_repo::SubtaskRepository;
use crate::repo::task_repo::{TaskFilters, TaskRepository};
use crate::repo::RepoError;
use crate::scope::Scope;
use crate::view::{CategorySummary, TaskDetail, TaskStatistics};
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use log::info;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for task use-cases.
#[derive(Debug)]
pub enum TaskServiceError {
    /// Referenced category is absent or owned by another user.
    CategoryNotFound(CategoryId),
    /// Year/month pair does not name a valid calendar month.
    InvalidMonth { year: i32, month: u32 },
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CategoryNotFound(id) => write!(f, "category not found: {id}"),
            Self::InvalidMonth { year, month } => {
                write!(f, "invalid calendar month: {year}-{month}")
            }
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent task state: {details}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Input for creating a task. Omitted fields fall back to entity defaults
/// (status pending, priority medium).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Task service facade over the scoped repositories.
pub struct TaskService<T, C, S>
where
    T: TaskRepository,
    C: CategoryRepository,
    S: SubtaskRepository,
{
    scope: Scope,
    tasks: T,
    categories: C,
    subtasks: S,
}

impl<T, C, S> TaskService<T, C, S>
where
    T: TaskRepository,
    C: CategoryRepository,
    S: SubtaskRepository,
{
    /// Creates a service bound to one acting identity.
    pub fn new(scope: Scope, tasks: T, categories: C, subtasks: S) -> Self {
        Self {
            scope,
            tasks,
            categories,
            subtasks,
        }
    }

    /// Creates a task, enforcing that a referenced category belongs to the
    /// acting user.
    pub fn create_task(&self, input: NewTask) -> Result<Task, TaskServiceError> {
        let Some(user_id) = self.scope.user_id() else {
            return Err(RepoError::AnonymousWrite.into());
        };

        if let Some(category_id) = input.category_id {
            self.require_category(category_id)?;
        }

        let mut task = Task::new(user_id, input.title);
        task.description = input.description;
        task.category_id = input.category_id;
        if let Some(priority) = input.priority {
            task.priority = priority;
        }
        task.due_date = input.due_date;

        let id = self.tasks.create(&task)?;
        info!("event=task_create module=service status=ok task={id}");
        self.tasks
            .get_by_id(id)?
            .ok_or(TaskServiceError::InconsistentState(
                "created task not found in read-back",
            ))
    }

    /// Applies a partial update. Returns `Ok(None)` when the task is absent
    /// or not owned.
    pub fn update_task(
        &self,
        id: TaskId,
        patch: &TaskPatch,
    ) -> Result<Option<Task>, TaskServiceError> {
        let Some(mut task) = self.tasks.get_by_id(id)? else {
            return Ok(None);
        };

        if let Some(Some(category_id)) = patch.category_id {
            self.require_category(category_id)?;
        }

        task.apply_patch(patch);
        self.tasks.update(&task)?;
        self.read_back(id).map(Some)
    }

    /// Deletes a task (subtasks cascade). Returns `false` when absent.
    pub fn delete_task(&self, id: TaskId) -> Result<bool, TaskServiceError> {
        let deleted = self.tasks.delete_by_id(id)?;
        if deleted {
            info!("event=task_delete module=service status=ok task={id}");
        }
        Ok(deleted)
    }

    pub fn get_task_by_id(&self, id: TaskId) -> Result<Option<Task>, TaskServiceError> {
        Ok(self.tasks.get_by_id(id)?)
    }

    /// Lists tasks; all present filters apply as a logical AND, with search
    /// intersecting the other filters.
    pub fn get_all_tasks(&self, filters: &TaskFilters) -> Result<Vec<Task>, TaskServiceError> {
        Ok(self.tasks.list_filtered(filters)?)
    }

    /// Tasks due inside the inclusive `[start, end]` range.
    pub fn get_tasks_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Task>, TaskServiceError> {
        Ok(self.tasks.list_by_date_range(start, end)?)
    }

    /// Groups the month's tasks by the `YYYY-MM-DD` of their due date.
    ///
    /// The range covers the whole calendar month in UTC, ending at 23:59:59
    /// of its last day (leap-year aware). Tasks without a due date never
    /// appear; within each group the creation-recency order is preserved.
    pub fn get_tasks_for_month(
        &self,
        year: i32,
        month: u32,
    ) -> Result<BTreeMap<String, Vec<Task>>, TaskServiceError> {
        let (first, last) = month_bounds(year, month)
            .ok_or(TaskServiceError::InvalidMonth { year, month })?;

        let tasks = self.tasks.list_by_date_range(first, last)?;
        let mut by_date: BTreeMap<String, Vec<Task>> = BTreeMap::new();
        for task in tasks {
            let Some(due) = task.due_date else { continue };
            by_date
                .entry(due.format("%Y-%m-%d").to_string())
                .or_default()
                .push(task);
        }

        Ok(by_date)
    }

    /// Marks a task completed; `Ok(None)` when absent.
    pub fn mark_task_completed(&self, id: TaskId) -> Result<Option<Task>, TaskServiceError> {
        self.transition(id, Task::mark_completed)
    }

    /// Reverts a task to pending; `Ok(None)` when absent.
    pub fn mark_task_pending(&self, id: TaskId) -> Result<Option<Task>, TaskServiceError> {
        self.transition(id, Task::mark_pending)
    }

    /// Toggles between completed and pending; `Ok(None)` when absent.
    pub fn toggle_task_status(&self, id: TaskId) -> Result<Option<Task>, TaskServiceError> {
        self.transition(id, |task| {
            if task.is_completed() {
                task.mark_pending();
            } else {
                task.mark_completed();
            }
        })
    }

    /// Status tally computed with four count queries, never full rows.
    pub fn get_task_statistics(&self) -> Result<TaskStatistics, TaskServiceError> {
        Ok(TaskStatistics {
            total: self.tasks.count()?,
            pending: self.tasks.count_by_status(TaskStatus::Pending)?,
            in_progress: self.tasks.count_by_status(TaskStatus::InProgress)?,
            completed: self.tasks.count_by_status(TaskStatus::Completed)?,
        })
    }

    /// Assembles the full boundary representation for one task.
    pub fn get_task_detail(&self, id: TaskId) -> Result<Option<TaskDetail>, TaskServiceError> {
        let Some(task) = self.tasks.get_by_id(id)? else {
            return Ok(None);
        };

        let category_details = match task.category_id {
            Some(category_id) => match self.categories.get_by_id(category_id)? {
                Some(category) => {
                    let task_count = self.tasks.count_by_category(category_id)?;
                    Some(CategorySummary::new(&category, task_count))
                }
                // Detached concurrently; render as uncategorized.
                None => None,
            },
            None => None,
        };

        let subtasks = self.subtasks.list_by_task(task.uuid)?;
        Ok(Some(TaskDetail::from_parts(
            &task,
            category_details,
            &subtasks,
        )))
    }

    fn transition(
        &self,
        id: TaskId,
        apply: impl FnOnce(&mut Task),
    ) -> Result<Option<Task>, TaskServiceError> {
        let Some(mut task) = self.tasks.get_by_id(id)? else {
            return Ok(None);
        };

        apply(&mut task);
        self.tasks.update(&task)?;
        self.read_back(id).map(Some)
    }

    fn read_back(&self, id: TaskId) -> Result<Task, TaskServiceError> {
        self.tasks
            .get_by_id(id)?
            .ok_or(TaskServiceError::InconsistentState(
                "updated task not found in read-back",
            ))
    }

    fn require_category(&self, category_id: CategoryId) -> Result<(), TaskServiceError> {
        match self.categories.get_by_id(category_id)? {
            Some(_) => Ok(()),
            None => Err(TaskServiceError::CategoryNotFound(category_id)),
        }
    }
}

/// First and last instant of a UTC calendar month, or `None` when the pair
/// does not name a valid month.
fn month_bounds(year: i32, month: u32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let first_day = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let last_day = next_month.pred_opt()?;

    let first = Utc
        .with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()?;
    let last = Utc
        .with_ymd_and_hms(year, month, last_day.day(), 23, 59, 59)
        .single()?;
    debug_assert_eq!(first_day.month(), last_day.month());
    Some((first, last))
}
