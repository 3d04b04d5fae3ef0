use crewtasks::models::{NewTask, Priority, Recurrence, Status};
use crewtasks::status::Bulb;
use crewtasks::storage::{SqliteStore, TaskRepository};
use crewtasks::tui::app::{AddStep, App, InputMode, ViewMode};
use chrono::NaiveDate;
use std::cell::Cell;
use std::rc::Rc;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
}

fn seed(store: &SqliteStore, title: &str, assigned_to: i64, priority: Priority, subtasks: &[&str]) -> i64 {
    store
        .insert_task(&NewTask {
            title: title.into(),
            description: None,
            category: None,
            assigned_to,
            deadline: NaiveDate::from_ymd_opt(2024, 3, 12).unwrap(),
            priority,
            recurrence: Recurrence::None,
            file_path: None,
            subtasks: subtasks.iter().map(|s| s.to_string()).collect(),
        })
        .unwrap()
}

fn type_line<R: TaskRepository>(app: &mut App<R>, text: &str) {
    app.input_buffer.push_str(text);
    app.handle_input();
}

#[test]
fn test_opens_on_first_employee() {
    let store = SqliteStore::open_in_memory().unwrap();
    seed(&store, "Mine", 1, Priority::Low, &["step"]);
    seed(&store, "Theirs", 2, Priority::Low, &[]);

    let app = App::new(&store, today).unwrap();
    assert_eq!(app.current_employee().unwrap().name, "Zaedul Islam");
    assert_eq!(app.tasks.len(), 1);
    assert_eq!(app.selected_task().unwrap().title, "Mine");
    assert_eq!(app.subtasks.len(), 1);
    assert_eq!(app.counts[0].1, 1);
}

#[test]
fn test_switching_employees_wraps() {
    let store = SqliteStore::open_in_memory().unwrap();
    seed(&store, "Theirs", 2, Priority::Low, &[]);

    let mut app = App::new(&store, today).unwrap();
    app.next_employee();
    assert_eq!(app.current_employee().unwrap().id, 2);
    assert_eq!(app.tasks[0].title, "Theirs");

    app.previous_employee();
    app.previous_employee();
    assert_eq!(app.current_employee().unwrap().id, 10);
    assert!(app.tasks.is_empty());
    assert!(app.selected_task().is_none());
}

#[test]
fn test_cycle_status_and_subtasks() {
    let store = SqliteStore::open_in_memory().unwrap();
    let id = seed(&store, "Task", 1, Priority::Medium, &["a", "b"]);

    let mut app = App::new(&store, today).unwrap();
    app.cycle_status();
    assert_eq!(store.task(id).unwrap().unwrap().status, Status::InProgress);
    app.cycle_status();
    app.cycle_status();
    assert_eq!(store.task(id).unwrap().unwrap().status, Status::Pending);

    app.complete_next_subtask();
    app.complete_next_subtask();
    assert!(app.subtasks.iter().all(|s| s.status.is_completed()));
}

#[test]
fn test_priority_toggle_reorders() {
    let store = SqliteStore::open_in_memory().unwrap();
    seed(&store, "low", 1, Priority::Low, &[]);
    seed(&store, "high", 1, Priority::High, &[]);

    let mut app = App::new(&store, today).unwrap();
    assert_eq!(app.tasks[0].title, "low");
    app.toggle_priority_sort();
    assert_eq!(app.tasks[0].title, "high");

    app.next();
    assert_eq!(app.selected_task().unwrap().title, "low");
    app.next();
    assert_eq!(app.selected_task().unwrap().title, "high");
    app.previous();
    assert_eq!(app.selected_task().unwrap().title, "low");
}

#[test]
fn test_add_wizard_creates_task() {
    let store = SqliteStore::open_in_memory().unwrap();
    let mut app = App::new(&store, today).unwrap();

    app.start_add();
    assert_eq!(app.input_mode, InputMode::Adding);
    type_line(&mut app, "");
    assert_eq!(app.add_state.step, AddStep::Title);
    type_line(&mut app, "Inventory");
    type_line(&mut app, "Count the servers");
    type_line(&mut app, "");
    type_line(&mut app, "2024-03-15");
    type_line(&mut app, "high");
    type_line(&mut app, "weekly");
    type_line(&mut app, "Rack A, Rack B");

    assert_eq!(app.input_mode, InputMode::Normal);
    assert_eq!(app.tasks.len(), 1);
    let task = &app.tasks[0];
    assert_eq!(task.title, "Inventory");
    assert_eq!(task.description.as_deref(), Some("Count the servers"));
    assert_eq!(task.category, None);
    assert_eq!(task.priority, Priority::High);
    assert_eq!(task.recurrence, Recurrence::Weekly);
    assert_eq!(store.subtasks(task.id).unwrap().len(), 2);
}

#[test]
fn test_add_wizard_reports_validation_errors() {
    let store = SqliteStore::open_in_memory().unwrap();
    let mut app = App::new(&store, today).unwrap();

    app.start_add();
    for line in ["Late", "", "", "2020-01-01", "", "", ""] {
        type_line(&mut app, line);
    }
    assert_eq!(app.input_mode, InputMode::Normal);
    assert!(app.message.as_deref().unwrap().starts_with("Error:"));
    assert!(store.tasks().unwrap().is_empty());
}

#[test]
fn test_toggle_view() {
    let store = SqliteStore::open_in_memory().unwrap();
    let mut app = App::new(&store, today).unwrap();
    app.toggle_view();
    assert_eq!(app.view_mode, ViewMode::Chart);
    app.toggle_view();
    assert_eq!(app.view_mode, ViewMode::Tasks);
}

#[test]
fn test_indicators_follow_the_clock() {
    let store = SqliteStore::open_in_memory().unwrap();
    seed(&store, "Report", 1, Priority::Medium, &[]);

    let now = Rc::new(Cell::new(today()));
    let clock = Rc::clone(&now);
    let mut app = App::new(&store, move || clock.get()).unwrap();

    // Deadline 2024-03-12
    assert_eq!(app.indicator(&app.tasks[0]), (2, Bulb::Yellow));

    now.set(NaiveDate::from_ymd_opt(2024, 3, 13).unwrap());
    assert_eq!(app.today(), NaiveDate::from_ymd_opt(2024, 3, 13).unwrap());
    assert_eq!(app.indicator(&app.tasks[0]), (-1, Bulb::Red));

    app.cycle_status();
    app.cycle_status();
    assert_eq!(app.tasks[0].status, Status::Completed);
    assert_eq!(app.indicator(&app.tasks[0]), (-1, Bulb::Green));
}

#[test]
fn test_add_wizard_checks_deadline_against_current_day() {
    let store = SqliteStore::open_in_memory().unwrap();
    let now = Rc::new(Cell::new(today()));
    let clock = Rc::clone(&now);
    let mut app = App::new(&store, move || clock.get()).unwrap();

    // Opened on the 10th, still running on the 16th
    now.set(NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
    app.start_add();
    for line in ["Stale", "", "", "2024-03-15", "", "", ""] {
        type_line(&mut app, line);
    }
    assert!(app.message.as_deref().unwrap().starts_with("Error:"));
    assert!(store.tasks().unwrap().is_empty());

    app.start_add();
    for line in ["Fresh", "", "", "2024-03-16", "", "", ""] {
        type_line(&mut app, line);
    }
    assert_eq!(store.tasks().unwrap().len(), 1);
}
