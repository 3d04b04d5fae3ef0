use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use tracing::{debug, warn};

use crate::attachment::{parse_file, UNSUPPORTED_FORMAT};
use crate::error::{Error, Result};
use crate::models::{parse_date, NewTask, Priority, Recurrence, Status};
use crate::query::{employee_tasks, task_counts};
use crate::status::{describe_remaining, remaining_days, status_bulb, Bulb};
use crate::storage::TaskRepository;

/// Raw input for a new task, as entered on the command line or in the
/// dashboard.
#[derive(Debug, Clone, Default)]
pub struct AddTask {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub assigned_to: Option<i64>,
    /// Deadline in `YYYY-MM-DD`.
    pub deadline: String,
    pub priority: Option<String>,
    pub recurrence: Option<String>,
    pub subtasks: Vec<String>,
    /// Supporting file. Only its name is stored.
    pub file: Option<PathBuf>,
}

/// Validates `input` and turns it into a [`NewTask`] without touching the
/// store beyond the assignee lookup.
pub fn validate_task(repo: &impl TaskRepository, input: AddTask, today: NaiveDate, silent: bool) -> Result<NewTask> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(Error::MissingField("title"));
    }
    let assigned_to = input.assigned_to.ok_or(Error::MissingField("assignee"))?;
    if repo.employee(assigned_to)?.is_none() {
        return Err(Error::EmployeeNotFound(assigned_to));
    }

    let deadline = parse_date(&input.deadline)?;
    if deadline < today {
        return Err(Error::DeadlineInPast(deadline));
    }
    let priority: Priority = match input.priority.as_deref() {
        Some(p) => p.parse()?,
        None => Priority::default(),
    };
    let recurrence: Recurrence = match input.recurrence.as_deref() {
        Some(r) => r.parse()?,
        None => Recurrence::None,
    };

    let file_path = match &input.file {
        Some(path) => attach(path, silent)?,
        None => None,
    };

    Ok(NewTask {
        title: title.to_string(),
        description: non_blank(input.description),
        category: non_blank(input.category),
        assigned_to,
        deadline,
        priority,
        recurrence,
        file_path,
        subtasks: input
            .subtasks
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
    })
}

/// Adds a new task with its subtasks and returns its id.
///
/// Validation failures leave the store untouched. An attachment of an
/// unsupported type is reported and dropped, the task is still created.
pub fn cmd_add(repo: &impl TaskRepository, input: AddTask, today: NaiveDate, silent: bool) -> Result<i64> {
    let task = validate_task(repo, input, today, silent)?;
    let id = repo.insert_task(&task)?;
    if !silent {
        let who = repo
            .employee(task.assigned_to)?
            .map(|e| e.name)
            .unwrap_or_default();
        println!("Task '{}' assigned to {} (id = {})", task.title, who, id);
    }
    Ok(id)
}

/// Reads an attachment and returns the file name to store, if any.
fn attach(path: &Path, silent: bool) -> Result<Option<String>> {
    let parsed = parse_file(path)?;
    if parsed.file_name.is_none() {
        warn!(path = %path.display(), "unsupported attachment dropped");
    }
    if !silent {
        if parsed.content == UNSUPPORTED_FORMAT {
            println!("{}", parsed.content);
        } else {
            println!("Preview of uploaded file:\n{}", parsed.content);
        }
    }
    Ok(parsed.file_name)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Lists an employee's tasks with their remaining time and status bulb.
pub fn cmd_list(repo: &impl TaskRepository, employee_id: i64, by_priority: bool, today: NaiveDate) -> Result<()> {
    let employee = repo
        .employee(employee_id)?
        .ok_or(Error::EmployeeNotFound(employee_id))?;
    let tasks = employee_tasks(repo, employee_id, by_priority)?;
    if tasks.is_empty() {
        println!("No tasks assigned to {}.", employee.name);
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Title").add_attribute(Attribute::Bold),
            Cell::new("Category").add_attribute(Attribute::Bold),
            Cell::new("Priority").add_attribute(Attribute::Bold),
            Cell::new("Recurrence").add_attribute(Attribute::Bold),
            Cell::new("Deadline").add_attribute(Attribute::Bold),
            Cell::new("Remaining").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new("File").add_attribute(Attribute::Bold),
            Cell::new("Subtasks").add_attribute(Attribute::Bold),
        ]);

    for t in &tasks {
        let days_left = remaining_days(t.deadline, today);
        let bulb = status_bulb(t.status, days_left);
        let subtasks = repo.subtasks(t.id)?;
        let done = subtasks.iter().filter(|s| s.status.is_completed()).count();
        let subtask_lines: Vec<String> = subtasks
            .iter()
            .map(|s| format!("- [{}] {} ({})", s.id, s.title, s.status))
            .collect();
        let subtask_cell = if subtasks.is_empty() {
            "-".to_string()
        } else {
            format!("{}/{}\n{}", done, subtasks.len(), subtask_lines.join("\n"))
        };

        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(&t.title),
            Cell::new(t.category.clone().unwrap_or_default()),
            Cell::new(t.priority),
            Cell::new(&t.recurrence),
            Cell::new(t.deadline),
            Cell::new(describe_remaining(days_left)).fg(if days_left < 0 && !t.status.is_completed() {
                Color::Red
            } else {
                Color::Reset
            }),
            Cell::new(format!("{} {}", bulb.symbol(), t.status)).fg(bulb_color(bulb)),
            Cell::new(t.file_path.clone().unwrap_or_default()),
            Cell::new(subtask_cell),
        ]);
    }

    println!("Tasks for {} ({})", employee.name, employee.department);
    println!("{table}");
    debug!(employee_id, count = tasks.len(), "listed tasks");
    Ok(())
}

/// Table colour of a bulb. The dashboard has its own ratatui version.
pub fn bulb_color(bulb: Bulb) -> Color {
    match bulb {
        Bulb::Green => Color::Green,
        Bulb::Yellow => Color::Yellow,
        Bulb::Red => Color::Red,
    }
}

/// Updates a task's status.
pub fn cmd_status(repo: &impl TaskRepository, id: i64, status: Status, silent: bool) -> Result<()> {
    repo.update_task_status(id, status)?;
    if !silent { println!("Task {} marked as {}.", id, status); }
    Ok(())
}

/// Updates a subtask's status independently of its parent.
pub fn cmd_subtask_status(repo: &impl TaskRepository, id: i64, status: Status, silent: bool) -> Result<()> {
    repo.update_subtask_status(id, status)?;
    if !silent { println!("Subtask {} marked as {}.", id, status); }
    Ok(())
}

/// Lists all employees.
pub fn cmd_employees(repo: &impl TaskRepository) -> Result<()> {
    let employees = repo.employees()?;
    if employees.is_empty() {
        println!("No employees found in the database.");
        return Ok(());
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL)
        .set_header(vec!["ID", "Name", "Department"]);
    for e in employees {
        table.add_row(vec![e.id.to_string(), e.name, e.department]);
    }
    println!("{table}");
    Ok(())
}

/// Shows the number of tasks assigned to each employee as a bar chart.
pub fn cmd_summary(repo: &impl TaskRepository) -> Result<()> {
    let counts = task_counts(repo)?;
    let max = counts.iter().map(|(_, c)| *c).max().unwrap_or(0);
    let mut table = Table::new();
    table.load_preset(UTF8_FULL)
        .set_header(vec!["Employee", "Tasks", ""]);
    for (name, count) in counts {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(count),
            Cell::new(bar(count, max, 30)).fg(Color::Cyan),
        ]);
    }
    println!("Total tasks assigned to employees");
    println!("{table}");
    Ok(())
}

/// A horizontal bar of at most `width` cells, scaled against `max`.
pub fn bar(value: usize, max: usize, width: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let cells = (value * width + max - 1) / max;
    "█".repeat(cells)
}

/// Prints the preview of a supporting file without attaching it.
pub fn cmd_preview(path: &Path) -> Result<()> {
    let parsed = parse_file(path)?;
    println!("{}", parsed.content);
    Ok(())
}

/// Deletes all tasks and subtasks after confirmation.
pub fn cmd_reset(repo: &impl TaskRepository, force: bool) -> Result<()> {
    if !force {
        print!("Are you sure you want to delete all tasks? This cannot be undone. [y/N] ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if input.trim().to_lowercase() != "y" {
            println!("Aborted.");
            return Ok(());
        }
    }

    repo.reset()?;
    println!("Database reset successfully.");
    Ok(())
}
