use crewtasks::models::{NewTask, Priority, Recurrence, Status};
use crewtasks::recurrence::{expand_recurring, next_deadline};
use crewtasks::storage::{SqliteStore, TaskRepository};
use chrono::NaiveDate;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn recurring(title: &str, deadline: NaiveDate, recurrence: Recurrence) -> NewTask {
    NewTask {
        title: title.into(),
        description: Some("Weekly numbers".into()),
        category: Some("Finance".into()),
        assigned_to: 3,
        deadline,
        priority: Priority::High,
        recurrence,
        file_path: Some("numbers.csv".into()),
        subtasks: vec!["Collect".into()],
    }
}

#[test]
fn test_next_deadline() {
    let d = date(2024, 3, 10);
    assert_eq!(next_deadline(&Recurrence::Daily, d), Some(date(2024, 3, 11)));
    assert_eq!(next_deadline(&Recurrence::Weekly, d), Some(date(2024, 3, 17)));
    assert_eq!(next_deadline(&Recurrence::Monthly, d), Some(date(2024, 4, 10)));
    assert_eq!(next_deadline(&Recurrence::None, d), None);
    assert_eq!(next_deadline(&Recurrence::Unknown("Yearly".into()), d), None);
}

#[test]
fn test_monthly_crosses_year_boundary() {
    assert_eq!(next_deadline(&Recurrence::Monthly, date(2023, 12, 15)), Some(date(2024, 1, 15)));
}

#[test]
fn test_monthly_clamps_to_month_end() {
    assert_eq!(next_deadline(&Recurrence::Monthly, date(2024, 1, 31)), Some(date(2024, 2, 29)));
    assert_eq!(next_deadline(&Recurrence::Monthly, date(2023, 1, 31)), Some(date(2023, 2, 28)));
}

#[test]
fn test_daily_overdue_task_rolls_over_once() {
    let store = SqliteStore::open_in_memory().unwrap();
    let today = date(2024, 3, 10);
    let source = store.insert_task(&recurring("Standup notes", date(2024, 3, 9), Recurrence::Daily)).unwrap();

    let created = expand_recurring(&store, today).unwrap();
    assert_eq!(created.len(), 1);

    let follow_up = store.task(created[0]).unwrap().unwrap();
    assert_eq!(follow_up.deadline, date(2024, 3, 10));
    assert_eq!(follow_up.title, "Standup notes");
    assert_eq!(follow_up.description.as_deref(), Some("Weekly numbers"));
    assert_eq!(follow_up.category.as_deref(), Some("Finance"));
    assert_eq!(follow_up.assigned_to, 3);
    assert_eq!(follow_up.priority, Priority::High);
    assert_eq!(follow_up.recurrence, Recurrence::Daily);
    assert_eq!(follow_up.status, Status::Pending);
    assert_eq!(follow_up.file_path, None);
    assert!(store.subtasks(follow_up.id).unwrap().is_empty());

    let source = store.task(source).unwrap().unwrap();
    assert_eq!(source.deadline, date(2024, 3, 9));
    assert_eq!(source.rolled_over_on, Some(today));
}

#[test]
fn test_second_run_creates_nothing() {
    let store = SqliteStore::open_in_memory().unwrap();
    let today = date(2024, 3, 10);
    store.insert_task(&recurring("Report", date(2024, 3, 1), Recurrence::Weekly)).unwrap();

    assert_eq!(expand_recurring(&store, today).unwrap().len(), 1);
    assert!(expand_recurring(&store, today).unwrap().is_empty());
    assert_eq!(store.tasks().unwrap().len(), 2);
}

#[test]
fn test_late_rollover_keeps_cadence() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.insert_task(&recurring("Backup", date(2024, 3, 1), Recurrence::Daily)).unwrap();

    // Expander runs five days late: the follow-up is due the day after the
    // old deadline, not today.
    let created = expand_recurring(&store, date(2024, 3, 6)).unwrap();
    let follow_up = store.task(created[0]).unwrap().unwrap();
    assert_eq!(follow_up.deadline, date(2024, 3, 2));

    // The still-overdue follow-up rolls over on the next start.
    let created = expand_recurring(&store, date(2024, 3, 7)).unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(store.task(created[0]).unwrap().unwrap().deadline, date(2024, 3, 3));
}

#[test]
fn test_deadline_today_or_later_is_not_expanded() {
    let store = SqliteStore::open_in_memory().unwrap();
    let today = date(2024, 3, 10);
    store.insert_task(&recurring("Due today", today, Recurrence::Daily)).unwrap();
    store.insert_task(&recurring("Due later", date(2024, 3, 20), Recurrence::Monthly)).unwrap();

    assert!(expand_recurring(&store, today).unwrap().is_empty());
}

#[test]
fn test_non_recurring_task_is_not_expanded() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.insert_task(&recurring("One-off", date(2024, 1, 1), Recurrence::None)).unwrap();

    assert!(expand_recurring(&store, date(2024, 3, 10)).unwrap().is_empty());
    assert_eq!(store.tasks().unwrap().len(), 1);
}

#[test]
fn test_unknown_recurrence_is_skipped() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.insert_task(&recurring("Odd", date(2024, 1, 1), Recurrence::Unknown("Yearly".into()))).unwrap();

    assert!(expand_recurring(&store, date(2024, 3, 10)).unwrap().is_empty());
    let tasks = store.tasks().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].recurrence, Recurrence::Unknown("Yearly".into()));
    assert_eq!(tasks[0].rolled_over_on, None);
}

#[test]
fn test_completed_recurring_task_still_rolls_over() {
    let store = SqliteStore::open_in_memory().unwrap();
    let id = store.insert_task(&recurring("Payroll", date(2023, 12, 15), Recurrence::Monthly)).unwrap();
    store.update_task_status(id, Status::Completed).unwrap();

    let created = expand_recurring(&store, date(2024, 1, 2)).unwrap();
    assert_eq!(created.len(), 1);
    let follow_up = store.task(created[0]).unwrap().unwrap();
    assert_eq!(follow_up.deadline, date(2024, 1, 15));
    assert_eq!(follow_up.status, Status::Pending);
}
