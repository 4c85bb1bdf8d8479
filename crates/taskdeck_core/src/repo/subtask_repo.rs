//! Subtask repository contract and SQLite implementation.
//!
//! # Invariants
//! - Subtasks carry no owner column; every statement joins through the
//!   parent task's `user_id`.
//! - Multi-row reads are ordered by `sort_order ASC, created_at ASC`.
//! - Creating a subtask requires the parent task to be owned by the scope.

use crate::model::subtask::{Subtask, SubtaskId};
use crate::model::task::TaskId;
use crate::repo::{
    bool_from_int, bool_to_int, from_epoch_ms, opt_from_epoch_ms, parse_uuid, to_epoch_ms,
    RepoError, RepoResult,
};
use crate::scope::Scope;
use rusqlite::{params, Connection, Row};

const SUBTASK_SELECT_SQL: &str = "SELECT
    s.uuid,
    s.task_uuid,
    s.title,
    s.is_completed,
    s.completed_at,
    s.sort_order,
    s.created_at
FROM subtasks s
INNER JOIN tasks t ON t.uuid = s.task_uuid";

/// Repository interface for subtask persistence.
pub trait SubtaskRepository {
    fn create(&self, subtask: &Subtask) -> RepoResult<SubtaskId>;
    fn update(&self, subtask: &Subtask) -> RepoResult<()>;
    fn get_by_id(&self, id: SubtaskId) -> RepoResult<Option<Subtask>>;
    fn list_by_task(&self, task_id: TaskId) -> RepoResult<Vec<Subtask>>;
    fn delete_by_id(&self, id: SubtaskId) -> RepoResult<bool>;

    fn delete(&self, subtask: &Subtask) -> RepoResult<bool> {
        self.delete_by_id(subtask.uuid)
    }
}

/// SQLite-backed subtask repository bound to one acting identity.
pub struct SqliteSubtaskRepository<'conn> {
    conn: &'conn Connection,
    scope: Scope,
}

impl<'conn> SqliteSubtaskRepository<'conn> {
    pub fn new(conn: &'conn Connection, scope: Scope) -> Self {
        Self { conn, scope }
    }

    fn owns_task(&self, task_id: TaskId, user_id: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM tasks WHERE uuid = ?1 AND user_id = ?2
            );",
            params![task_id.to_string(), user_id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

impl SubtaskRepository for SqliteSubtaskRepository<'_> {
    fn create(&self, subtask: &Subtask) -> RepoResult<SubtaskId> {
        let Some(user_id) = self.scope.user_id() else {
            return Err(RepoError::AnonymousWrite);
        };
        subtask.validate()?;

        // Scoped existence check: a foreign parent task must look nonexistent.
        if !self.owns_task(subtask.task_id, &user_id.to_string())? {
            return Err(RepoError::NotFound(subtask.task_id));
        }

        self.conn.execute(
            "INSERT INTO subtasks (
                uuid,
                task_uuid,
                title,
                is_completed,
                completed_at,
                sort_order,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                subtask.uuid.to_string(),
                subtask.task_id.to_string(),
                subtask.title.as_str(),
                bool_to_int(subtask.is_completed),
                subtask.completed_at.map(to_epoch_ms),
                subtask.sort_order,
                to_epoch_ms(subtask.created_at),
            ],
        )?;

        Ok(subtask.uuid)
    }

    fn update(&self, subtask: &Subtask) -> RepoResult<()> {
        let Some(user_id) = self.scope.user_id() else {
            return Err(RepoError::AnonymousWrite);
        };
        subtask.validate()?;

        let changed = self.conn.execute(
            "UPDATE subtasks
             SET
                title = ?1,
                is_completed = ?2,
                completed_at = ?3,
                sort_order = ?4
             WHERE uuid = ?5
               AND task_uuid IN (SELECT uuid FROM tasks WHERE user_id = ?6);",
            params![
                subtask.title.as_str(),
                bool_to_int(subtask.is_completed),
                subtask.completed_at.map(to_epoch_ms),
                subtask.sort_order,
                subtask.uuid.to_string(),
                user_id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(subtask.uuid));
        }

        Ok(())
    }

    fn get_by_id(&self, id: SubtaskId) -> RepoResult<Option<Subtask>> {
        let Some(user_id) = self.scope.user_id() else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare(&format!(
            "{SUBTASK_SELECT_SQL} WHERE s.uuid = ?1 AND t.user_id = ?2;"
        ))?;
        let mut rows = stmt.query(params![id.to_string(), user_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_subtask_row(row)?));
        }

        Ok(None)
    }

    fn list_by_task(&self, task_id: TaskId) -> RepoResult<Vec<Subtask>> {
        let Some(user_id) = self.scope.user_id() else {
            return Ok(Vec::new());
        };

        let mut stmt = self.conn.prepare(&format!(
            "{SUBTASK_SELECT_SQL}
             WHERE s.task_uuid = ?1
               AND t.user_id = ?2
             ORDER BY s.sort_order ASC, s.created_at ASC, s.uuid ASC;"
        ))?;
        let mut rows = stmt.query(params![task_id.to_string(), user_id.to_string()])?;
        let mut subtasks = Vec::new();
        while let Some(row) = rows.next()? {
            subtasks.push(parse_subtask_row(row)?);
        }

        Ok(subtasks)
    }

    fn delete_by_id(&self, id: SubtaskId) -> RepoResult<bool> {
        let Some(user_id) = self.scope.user_id() else {
            return Ok(false);
        };

        let changed = self.conn.execute(
            "DELETE FROM subtasks
             WHERE uuid = ?1
               AND task_uuid IN (SELECT uuid FROM tasks WHERE user_id = ?2);",
            params![id.to_string(), user_id.to_string()],
        )?;

        Ok(changed > 0)
    }
}

fn parse_subtask_row(row: &Row<'_>) -> RepoResult<Subtask> {
    let uuid_text: String = row.get("uuid")?;
    let task_text: String = row.get("task_uuid")?;

    let subtask = Subtask {
        uuid: parse_uuid("subtasks.uuid", &uuid_text)?,
        task_id: parse_uuid("subtasks.task_uuid", &task_text)?,
        title: row.get("title")?,
        is_completed: bool_from_int("subtasks.is_completed", row.get("is_completed")?)?,
        completed_at: opt_from_epoch_ms("subtasks.completed_at", row.get("completed_at")?)?,
        sort_order: row.get("sort_order")?,
        created_at: from_epoch_ms("subtasks.created_at", row.get("created_at")?)?,
    };
    subtask.validate()?;
    Ok(subtask)
}
