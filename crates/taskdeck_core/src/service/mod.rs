//! Domain services orchestrating the scoped repositories.

pub mod category_service;
pub mod subtask_service;
pub mod task_service;

pub use category_service::{CategoryService, CategoryServiceError, NewCategory};
pub use subtask_service::{NewSubtask, SubtaskService, SubtaskServiceError};
pub use task_service::{NewTask, TaskService, TaskServiceError};
