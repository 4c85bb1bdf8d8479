//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide scoped CRUD, filter, and count APIs over `tasks` storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Every statement filters by `user_id`; non-owned rows are invisible.
//! - Multi-row reads are ordered by `created_at DESC, uuid ASC`.
//! - Write paths call `Task::validate()` before SQL mutations.

use crate::model::category::CategoryId;
use crate::model::task::{Task, TaskId, TaskPriority, TaskStatus};
use crate::repo::{
    from_epoch_ms, like_pattern, opt_from_epoch_ms, parse_uuid, to_epoch_ms, RepoError, RepoResult,
};
use crate::scope::Scope;
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    description,
    category_uuid,
    status,
    priority,
    due_date,
    completed_at,
    user_id,
    created_at,
    updated_at
FROM tasks";

const TASK_ORDER_SQL: &str = " ORDER BY created_at DESC, uuid ASC";

/// Optional filter set for task listing. All present filters apply as a
/// logical AND; `search` matches title or description as a substring,
/// case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilters {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub category_id: Option<CategoryId>,
    pub search: Option<String>,
}

/// Repository interface for task persistence.
pub trait TaskRepository {
    fn create(&self, task: &Task) -> RepoResult<TaskId>;
    fn update(&self, task: &Task) -> RepoResult<()>;
    fn get_by_id(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_all(&self) -> RepoResult<Vec<Task>>;
    fn list_filtered(&self, filters: &TaskFilters) -> RepoResult<Vec<Task>>;
    /// Tasks whose due date falls inside the inclusive `[start, end]` range.
    fn list_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepoResult<Vec<Task>>;
    fn delete_by_id(&self, id: TaskId) -> RepoResult<bool>;
    fn count(&self) -> RepoResult<u64>;
    fn count_by_status(&self, status: TaskStatus) -> RepoResult<u64>;
    fn count_by_category(&self, category_id: CategoryId) -> RepoResult<u64>;

    fn list_by_status(&self, status: TaskStatus) -> RepoResult<Vec<Task>> {
        self.list_filtered(&TaskFilters {
            status: Some(status),
            ..TaskFilters::default()
        })
    }

    fn list_by_priority(&self, priority: TaskPriority) -> RepoResult<Vec<Task>> {
        self.list_filtered(&TaskFilters {
            priority: Some(priority),
            ..TaskFilters::default()
        })
    }

    fn list_by_category(&self, category_id: CategoryId) -> RepoResult<Vec<Task>> {
        self.list_filtered(&TaskFilters {
            category_id: Some(category_id),
            ..TaskFilters::default()
        })
    }

    fn search(&self, text: &str) -> RepoResult<Vec<Task>> {
        self.list_filtered(&TaskFilters {
            search: Some(text.to_string()),
            ..TaskFilters::default()
        })
    }

    fn delete(&self, task: &Task) -> RepoResult<bool> {
        self.delete_by_id(task.uuid)
    }
}

/// SQLite-backed task repository bound to one acting identity.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
    scope: Scope,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection, scope: Scope) -> Self {
        Self { conn, scope }
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create(&self, task: &Task) -> RepoResult<TaskId> {
        let Some(user_id) = self.scope.user_id() else {
            return Err(RepoError::AnonymousWrite);
        };
        if task.user_id != user_id {
            return Err(RepoError::ScopeViolation);
        }
        task.validate()?;

        self.conn.execute(
            "INSERT INTO tasks (
                uuid,
                title,
                description,
                category_uuid,
                status,
                priority,
                due_date,
                completed_at,
                user_id,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                task.uuid.to_string(),
                task.title.as_str(),
                task.description.as_deref(),
                task.category_id.map(|id| id.to_string()),
                status_to_db(task.status),
                priority_to_db(task.priority),
                task.due_date.map(to_epoch_ms),
                task.completed_at.map(to_epoch_ms),
                user_id.to_string(),
                to_epoch_ms(task.created_at),
                to_epoch_ms(task.updated_at),
            ],
        )?;

        Ok(task.uuid)
    }

    fn update(&self, task: &Task) -> RepoResult<()> {
        let Some(user_id) = self.scope.user_id() else {
            return Err(RepoError::AnonymousWrite);
        };
        task.validate()?;

        // user_id is deliberately absent from SET: the owner is immutable.
        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                title = ?1,
                description = ?2,
                category_uuid = ?3,
                status = ?4,
                priority = ?5,
                due_date = ?6,
                completed_at = ?7,
                updated_at = ?8
             WHERE uuid = ?9
               AND user_id = ?10;",
            params![
                task.title.as_str(),
                task.description.as_deref(),
                task.category_id.map(|id| id.to_string()),
                status_to_db(task.status),
                priority_to_db(task.priority),
                task.due_date.map(to_epoch_ms),
                task.completed_at.map(to_epoch_ms),
                to_epoch_ms(Utc::now()),
                task.uuid.to_string(),
                user_id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(task.uuid));
        }

        Ok(())
    }

    fn get_by_id(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let Some(user_id) = self.scope.user_id() else {
            return Ok(None);
        };

        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE uuid = ?1 AND user_id = ?2;"))?;
        let mut rows = stmt.query(params![id.to_string(), user_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }

        Ok(None)
    }

    fn list_all(&self) -> RepoResult<Vec<Task>> {
        self.list_filtered(&TaskFilters::default())
    }

    fn list_filtered(&self, filters: &TaskFilters) -> RepoResult<Vec<Task>> {
        let Some(user_id) = self.scope.user_id() else {
            return Ok(Vec::new());
        };

        let mut sql = format!("{TASK_SELECT_SQL} WHERE user_id = ?");
        let mut bind_values: Vec<Value> = vec![Value::Text(user_id.to_string())];

        if let Some(status) = filters.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status_to_db(status).to_string()));
        }

        if let Some(priority) = filters.priority {
            sql.push_str(" AND priority = ?");
            bind_values.push(Value::Text(priority_to_db(priority).to_string()));
        }

        if let Some(category_id) = filters.category_id {
            sql.push_str(" AND category_uuid = ?");
            bind_values.push(Value::Text(category_id.to_string()));
        }

        if let Some(search) = filters.search.as_deref() {
            // Search is one more AND leg, intersecting with the filters above.
            sql.push_str(
                " AND (LOWER(title) LIKE ? ESCAPE '\\'
                   OR LOWER(IFNULL(description, '')) LIKE ? ESCAPE '\\')",
            );
            let pattern = like_pattern(search);
            bind_values.push(Value::Text(pattern.clone()));
            bind_values.push(Value::Text(pattern));
        }

        sql.push_str(TASK_ORDER_SQL);
        sql.push(';');

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }

    fn list_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepoResult<Vec<Task>> {
        let Some(user_id) = self.scope.user_id() else {
            return Ok(Vec::new());
        };

        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE user_id = ?1
               AND due_date IS NOT NULL
               AND due_date >= ?2
               AND due_date <= ?3{TASK_ORDER_SQL};"
        ))?;
        let mut rows = stmt.query(params![
            user_id.to_string(),
            to_epoch_ms(start),
            to_epoch_ms(end)
        ])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }

    fn delete_by_id(&self, id: TaskId) -> RepoResult<bool> {
        let Some(user_id) = self.scope.user_id() else {
            return Ok(false);
        };

        let changed = self.conn.execute(
            "DELETE FROM tasks WHERE uuid = ?1 AND user_id = ?2;",
            params![id.to_string(), user_id.to_string()],
        )?;

        Ok(changed > 0)
    }

    fn count(&self) -> RepoResult<u64> {
        let Some(user_id) = self.scope.user_id() else {
            return Ok(0);
        };

        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM tasks WHERE user_id = ?1;",
            [user_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_by_status(&self, status: TaskStatus) -> RepoResult<u64> {
        let Some(user_id) = self.scope.user_id() else {
            return Ok(0);
        };

        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM tasks WHERE user_id = ?1 AND status = ?2;",
            params![user_id.to_string(), status_to_db(status)],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_by_category(&self, category_id: CategoryId) -> RepoResult<u64> {
        let Some(user_id) = self.scope.user_id() else {
            return Ok(0);
        };

        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM tasks WHERE user_id = ?1 AND category_uuid = ?2;",
            params![user_id.to_string(), category_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = parse_uuid("tasks.uuid", &uuid_text)?;

    let category_id = match row.get::<_, Option<String>>("category_uuid")? {
        Some(value) => Some(parse_uuid("tasks.category_uuid", &value)?),
        None => None,
    };

    let status_text: String = row.get("status")?;
    let status = parse_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in tasks.status"))
    })?;

    let priority_text: String = row.get("priority")?;
    let priority = parse_priority(&priority_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid priority `{priority_text}` in tasks.priority"
        ))
    })?;

    let user_text: String = row.get("user_id")?;

    let task = Task {
        uuid,
        title: row.get("title")?,
        description: row.get("description")?,
        category_id,
        status,
        priority,
        due_date: opt_from_epoch_ms("tasks.due_date", row.get("due_date")?)?,
        completed_at: opt_from_epoch_ms("tasks.completed_at", row.get("completed_at")?)?,
        created_at: from_epoch_ms("tasks.created_at", row.get("created_at")?)?,
        updated_at: from_epoch_ms("tasks.updated_at", row.get("updated_at")?)?,
        user_id: parse_uuid("tasks.user_id", &user_text)?,
    };
    task.validate()?;
    Ok(task)
}

fn status_to_db(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "pending",
        TaskStatus::InProgress => "in_progress",
        TaskStatus::Completed => "completed",
    }
}

fn parse_status(value: &str) -> Option<TaskStatus> {
    match value {
        "pending" => Some(TaskStatus::Pending),
        "in_progress" => Some(TaskStatus::InProgress),
        "completed" => Some(TaskStatus::Completed),
        _ => None,
    }
}

fn priority_to_db(priority: TaskPriority) -> &'static str {
    match priority {
        TaskPriority::Low => "low",
        TaskPriority::Medium => "medium",
        TaskPriority::High => "high",
    }
}

fn parse_priority(value: &str) -> Option<TaskPriority> {
    match value {
        "low" => Some(TaskPriority::Low),
        "medium" => Some(TaskPriority::Medium),
        "high" => Some(TaskPriority::High),
        _ => None,
    }
}
