use chrono::{TimeZone, Utc};
use taskdeck_core::db::open_db_in_memory;
use taskdeck_core::{NewTask, Scope, TaskServiceError};
use uuid::Uuid;

mod common;
use common::task_service;

#[test]
fn month_view_groups_by_due_date() {
    let conn = open_db_in_memory().unwrap();
    let service = task_service(&conn, Scope::user(Uuid::new_v4()));

    let feb_5 = Utc.with_ymd_and_hms(2024, 2, 5, 9, 0, 0).unwrap();
    let feb_5_later = Utc.with_ymd_and_hms(2024, 2, 5, 17, 30, 0).unwrap();
    let feb_20 = Utc.with_ymd_and_hms(2024, 2, 20, 12, 0, 0).unwrap();

    for (title, due) in [
        ("standup", feb_5),
        ("retro", feb_5_later),
        ("release", feb_20),
    ] {
        service
            .create_task(NewTask {
                title: title.to_string(),
                due_date: Some(due),
                ..NewTask::default()
            })
            .unwrap();
    }
    // No due date: never shows up in the calendar.
    service
        .create_task(NewTask {
            title: "someday".to_string(),
            ..NewTask::default()
        })
        .unwrap();

    let grouped = service.get_tasks_for_month(2024, 2).unwrap();
    assert_eq!(grouped.len(), 2);
    assert_eq!(grouped["2024-02-05"].len(), 2);
    assert_eq!(grouped["2024-02-20"].len(), 1);
    assert_eq!(grouped["2024-02-20"][0].title, "release");
}

#[test]
fn month_view_covers_leap_day_and_excludes_neighbors() {
    let conn = open_db_in_memory().unwrap();
    let service = task_service(&conn, Scope::user(Uuid::new_v4()));

    let leap_day_eod = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap();
    let jan_31 = Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap();
    let mar_1 = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

    for (title, due) in [
        ("leap deadline", leap_day_eod),
        ("january", jan_31),
        ("march", mar_1),
    ] {
        service
            .create_task(NewTask {
                title: title.to_string(),
                due_date: Some(due),
                ..NewTask::default()
            })
            .unwrap();
    }

    let grouped = service.get_tasks_for_month(2024, 2).unwrap();
    assert_eq!(grouped.len(), 1);
    assert_eq!(grouped["2024-02-29"][0].title, "leap deadline");
}

#[test]
fn month_view_keys_sort_chronologically() {
    let conn = open_db_in_memory().unwrap();
    let service = task_service(&conn, Scope::user(Uuid::new_v4()));

    for day in [25, 3, 14] {
        service
            .create_task(NewTask {
                title: format!("day {day}"),
                due_date: Some(Utc.with_ymd_and_hms(2025, 6, day, 8, 0, 0).unwrap()),
                ..NewTask::default()
            })
            .unwrap();
    }

    let grouped = service.get_tasks_for_month(2025, 6).unwrap();
    let keys: Vec<_> = grouped.keys().cloned().collect();
    assert_eq!(keys, vec!["2025-06-03", "2025-06-14", "2025-06-25"]);
}

#[test]
fn month_view_rejects_invalid_months() {
    let conn = open_db_in_memory().unwrap();
    let service = task_service(&conn, Scope::user(Uuid::new_v4()));

    let err = service.get_tasks_for_month(2024, 0).unwrap_err();
    assert!(matches!(
        err,
        TaskServiceError::InvalidMonth { year: 2024, month: 0 }
    ));
    let err = service.get_tasks_for_month(2024, 13).unwrap_err();
    assert!(matches!(
        err,
        TaskServiceError::InvalidMonth { month: 13, .. }
    ));
}

#[test]
fn date_range_listing_is_inclusive_on_both_ends() {
    let conn = open_db_in_memory().unwrap();
    let service = task_service(&conn, Scope::user(Uuid::new_v4()));

    let start = Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2025, 3, 12, 0, 0, 0).unwrap();

    for (title, due) in [
        ("at start", start),
        ("at end", end),
        ("before", start - chrono::Duration::seconds(1)),
        ("after", end + chrono::Duration::seconds(1)),
    ] {
        service
            .create_task(NewTask {
                title: title.to_string(),
                due_date: Some(due),
                ..NewTask::default()
            })
            .unwrap();
    }

    let in_range = service.get_tasks_by_date_range(start, end).unwrap();
    let titles: Vec<_> = in_range.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(in_range.len(), 2);
    assert!(titles.contains(&"at start"));
    assert!(titles.contains(&"at end"));
}
