use rusqlite::{params, Connection};
use taskdeck_core::db::open_db_in_memory;
use taskdeck_core::{
    NewTask, Scope, SqliteTaskRepository, TaskFilters, TaskId, TaskPatch, TaskPriority,
    TaskRepository, TaskStatus,
};
use uuid::Uuid;

mod common;
use common::task_service;

fn set_created_at(conn: &Connection, id: TaskId, epoch_ms: i64) {
    conn.execute(
        "UPDATE tasks SET created_at = ?1 WHERE uuid = ?2;",
        params![epoch_ms, id.to_string()],
    )
    .unwrap();
}

#[test]
fn list_all_orders_by_creation_recency() {
    let conn = open_db_in_memory().unwrap();
    let scope = Scope::user(Uuid::new_v4());
    let service = task_service(&conn, scope);

    let older = service
        .create_task(NewTask {
            title: "older".to_string(),
            ..NewTask::default()
        })
        .unwrap();
    let newer = service
        .create_task(NewTask {
            title: "newer".to_string(),
            ..NewTask::default()
        })
        .unwrap();
    set_created_at(&conn, older.uuid, 1_000);
    set_created_at(&conn, newer.uuid, 2_000);

    let listed = service.get_all_tasks(&TaskFilters::default()).unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].uuid, newer.uuid);
    assert_eq!(listed[1].uuid, older.uuid);
}

#[test]
fn filters_by_status_priority_and_category() {
    let conn = open_db_in_memory().unwrap();
    let scope = Scope::user(Uuid::new_v4());
    let service = task_service(&conn, scope);
    let categories = common::category_service(&conn, scope);

    let category = categories
        .create_category(taskdeck_core::NewCategory {
            name: "Work".to_string(),
            ..Default::default()
        })
        .unwrap();

    let in_category = service
        .create_task(NewTask {
            title: "review".to_string(),
            category_id: Some(category.uuid),
            priority: Some(TaskPriority::High),
            ..NewTask::default()
        })
        .unwrap();
    let completed = service
        .create_task(NewTask {
            title: "shipped".to_string(),
            ..NewTask::default()
        })
        .unwrap();
    service.mark_task_completed(completed.uuid).unwrap();

    let by_status = service
        .get_all_tasks(&TaskFilters {
            status: Some(TaskStatus::Completed),
            ..TaskFilters::default()
        })
        .unwrap();
    assert_eq!(by_status.len(), 1);
    assert_eq!(by_status[0].uuid, completed.uuid);

    let by_priority = service
        .get_all_tasks(&TaskFilters {
            priority: Some(TaskPriority::High),
            ..TaskFilters::default()
        })
        .unwrap();
    assert_eq!(by_priority.len(), 1);
    assert_eq!(by_priority[0].uuid, in_category.uuid);

    let by_category = service
        .get_all_tasks(&TaskFilters {
            category_id: Some(category.uuid),
            ..TaskFilters::default()
        })
        .unwrap();
    assert_eq!(by_category.len(), 1);
    assert_eq!(by_category[0].uuid, in_category.uuid);
}

#[test]
fn search_matches_title_or_description_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let scope = Scope::user(Uuid::new_v4());
    let service = task_service(&conn, scope);

    let by_title = service
        .create_task(NewTask {
            title: "Buy Groceries".to_string(),
            ..NewTask::default()
        })
        .unwrap();
    let by_description = service
        .create_task(NewTask {
            title: "errand".to_string(),
            description: Some("stop by the GROCERY store".to_string()),
            ..NewTask::default()
        })
        .unwrap();
    service
        .create_task(NewTask {
            title: "unrelated".to_string(),
            ..NewTask::default()
        })
        .unwrap();

    let hits = service
        .get_all_tasks(&TaskFilters {
            search: Some("grocer".to_string()),
            ..TaskFilters::default()
        })
        .unwrap();
    let ids: Vec<_> = hits.iter().map(|t| t.uuid).collect();
    assert_eq!(hits.len(), 2);
    assert!(ids.contains(&by_title.uuid));
    assert!(ids.contains(&by_description.uuid));
}

#[test]
fn search_intersects_with_other_filters() {
    // Combined filters AND together; search is one more AND leg rather than
    // a union with the already-filtered set.
    let conn = open_db_in_memory().unwrap();
    let scope = Scope::user(Uuid::new_v4());
    let service = task_service(&conn, scope);

    let matching = service
        .create_task(NewTask {
            title: "report draft".to_string(),
            ..NewTask::default()
        })
        .unwrap();
    let completed_match = service
        .create_task(NewTask {
            title: "report final".to_string(),
            ..NewTask::default()
        })
        .unwrap();
    service.mark_task_completed(completed_match.uuid).unwrap();
    service
        .create_task(NewTask {
            title: "pending but unrelated".to_string(),
            ..NewTask::default()
        })
        .unwrap();

    let hits = service
        .get_all_tasks(&TaskFilters {
            status: Some(TaskStatus::Pending),
            search: Some("report".to_string()),
            ..TaskFilters::default()
        })
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].uuid, matching.uuid);
}

#[test]
fn search_escapes_like_wildcards() {
    let conn = open_db_in_memory().unwrap();
    let scope = Scope::user(Uuid::new_v4());
    let service = task_service(&conn, scope);

    let literal = service
        .create_task(NewTask {
            title: "50%_off sale".to_string(),
            ..NewTask::default()
        })
        .unwrap();
    service
        .create_task(NewTask {
            title: "500 offers".to_string(),
            ..NewTask::default()
        })
        .unwrap();

    let hits = service
        .get_all_tasks(&TaskFilters {
            search: Some("50%_".to_string()),
            ..TaskFilters::default()
        })
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].uuid, literal.uuid);
}

#[test]
fn repository_filter_shortcuts_match_list_filtered() {
    let conn = open_db_in_memory().unwrap();
    let scope = Scope::user(Uuid::new_v4());
    let repo = SqliteTaskRepository::new(&conn, scope);
    let service = task_service(&conn, scope);

    let task = service
        .create_task(NewTask {
            title: "only one".to_string(),
            priority: Some(TaskPriority::Low),
            ..NewTask::default()
        })
        .unwrap();
    service
        .update_task(
            task.uuid,
            &TaskPatch {
                status: Some(TaskStatus::InProgress),
                ..TaskPatch::default()
            },
        )
        .unwrap();

    let by_status = repo.list_by_status(TaskStatus::InProgress).unwrap();
    assert_eq!(by_status.len(), 1);
    let by_priority = repo.list_by_priority(TaskPriority::Low).unwrap();
    assert_eq!(by_priority.len(), 1);
    let searched = repo.search("only").unwrap();
    assert_eq!(searched.len(), 1);
    assert_eq!(searched[0].uuid, task.uuid);
}
