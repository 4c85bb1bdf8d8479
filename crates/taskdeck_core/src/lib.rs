//! Core domain logic for taskdeck, a personal task manager.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod scope;
pub mod service;
pub mod view;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::category::{Category, CategoryId, CategoryPatch};
pub use model::subtask::{Subtask, SubtaskId, SubtaskPatch};
pub use model::task::{Task, TaskId, TaskPatch, TaskPriority, TaskStatus};
pub use model::ValidationError;
pub use repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
pub use repo::subtask_repo::{SqliteSubtaskRepository, SubtaskRepository};
pub use repo::task_repo::{SqliteTaskRepository, TaskFilters, TaskRepository};
pub use repo::{RepoError, RepoResult};
pub use scope::{Scope, UserId};
pub use service::{
    CategoryService, CategoryServiceError, NewCategory, NewSubtask, NewTask, SubtaskService,
    SubtaskServiceError, TaskService, TaskServiceError,
};
pub use view::{CategorySummary, SubtaskProgress, SubtaskView, TaskDetail, TaskStatistics};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
