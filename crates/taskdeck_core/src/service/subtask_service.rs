//! Subtask use-case service.
//!
//! # Invariants
//! - Creating a subtask requires the parent task to be visible in scope;
//!   a foreign task id is reported as not found, never as forbidden.
//! - Toggling twice restores the original completion state.

use crate::model::subtask::{Subtask, SubtaskId, SubtaskPatch};
use crate::model::task::TaskId;
use crate::repo::subtask_repo::SubtaskRepository;
use crate::repo::task_repo::TaskRepository;
use crate::repo::RepoError;
use crate::scope::Scope;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for subtask use-cases.
#[derive(Debug)]
pub enum SubtaskServiceError {
    /// Parent task is absent or owned by another user.
    TaskNotFound(TaskId),
    Repo(RepoError),
    InconsistentState(&'static str),
}

impl Display for SubtaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent subtask state: {details}")
            }
        }
    }
}

impl Error for SubtaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for SubtaskServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Input for creating a subtask.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewSubtask {
    pub title: String,
    pub sort_order: Option<i64>,
}

/// Subtask service facade over the scoped repositories.
pub struct SubtaskService<S, T>
where
    S: SubtaskRepository,
    T: TaskRepository,
{
    scope: Scope,
    subtasks: S,
    tasks: T,
}

impl<S, T> SubtaskService<S, T>
where
    S: SubtaskRepository,
    T: TaskRepository,
{
    pub fn new(scope: Scope, subtasks: S, tasks: T) -> Self {
        Self {
            scope,
            subtasks,
            tasks,
        }
    }

    /// Lists a task's subtasks in display order.
    pub fn get_subtasks_by_task(
        &self,
        task_id: TaskId,
    ) -> Result<Vec<Subtask>, SubtaskServiceError> {
        Ok(self.subtasks.list_by_task(task_id)?)
    }

    pub fn create_subtask(
        &self,
        task_id: TaskId,
        input: NewSubtask,
    ) -> Result<Subtask, SubtaskServiceError> {
        if self.scope.user_id().is_none() {
            return Err(RepoError::AnonymousWrite.into());
        }
        if self.tasks.get_by_id(task_id)?.is_none() {
            return Err(SubtaskServiceError::TaskNotFound(task_id));
        }

        let mut subtask = Subtask::new(task_id, input.title);
        if let Some(sort_order) = input.sort_order {
            subtask.sort_order = sort_order;
        }

        let id = self.subtasks.create(&subtask)?;
        self.read_back(id)
    }

    /// Applies a partial update; `Ok(None)` when absent or not owned.
    pub fn update_subtask(
        &self,
        id: SubtaskId,
        patch: &SubtaskPatch,
    ) -> Result<Option<Subtask>, SubtaskServiceError> {
        let Some(mut subtask) = self.subtasks.get_by_id(id)? else {
            return Ok(None);
        };

        subtask.apply_patch(patch);
        self.subtasks.update(&subtask)?;
        self.read_back(id).map(Some)
    }

    /// Flips completion; `Ok(None)` when absent or not owned.
    pub fn toggle_subtask(&self, id: SubtaskId) -> Result<Option<Subtask>, SubtaskServiceError> {
        let Some(mut subtask) = self.subtasks.get_by_id(id)? else {
            return Ok(None);
        };

        subtask.toggle();
        self.subtasks.update(&subtask)?;
        self.read_back(id).map(Some)
    }

    /// Deletes a subtask; `false` when absent or not owned.
    pub fn delete_subtask(&self, id: SubtaskId) -> Result<bool, SubtaskServiceError> {
        Ok(self.subtasks.delete_by_id(id)?)
    }

    fn read_back(&self, id: SubtaskId) -> Result<Subtask, SubtaskServiceError> {
        self.subtasks
            .get_by_id(id)?
            .ok_or(SubtaskServiceError::InconsistentState(
                "subtask not found in read-back",
            ))
    }
}
