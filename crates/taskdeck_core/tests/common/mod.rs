//! Shared constructors for service-level integration tests.

#![allow(dead_code)]

use rusqlite::Connection;
use taskdeck_core::{
    CategoryService, Scope, SqliteCategoryRepository, SqliteSubtaskRepository,
    SqliteTaskRepository, SubtaskService, TaskService,
};

pub fn task_service(
    conn: &Connection,
    scope: Scope,
) -> TaskService<
    SqliteTaskRepository<'_>,
    SqliteCategoryRepository<'_>,
    SqliteSubtaskRepository<'_>,
> {
    TaskService::new(
        scope,
        SqliteTaskRepository::new(conn, scope),
        SqliteCategoryRepository::new(conn, scope),
        SqliteSubtaskRepository::new(conn, scope),
    )
}

pub fn category_service(
    conn: &Connection,
    scope: Scope,
) -> CategoryService<SqliteCategoryRepository<'_>> {
    CategoryService::new(scope, SqliteCategoryRepository::new(conn, scope))
}

pub fn subtask_service(
    conn: &Connection,
    scope: Scope,
) -> SubtaskService<SqliteSubtaskRepository<'_>, SqliteTaskRepository<'_>> {
    SubtaskService::new(
        scope,
        SqliteSubtaskRepository::new(conn, scope),
        SqliteTaskRepository::new(conn, scope),
    )
}
