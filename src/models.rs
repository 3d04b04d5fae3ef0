use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// An employee tasks can be assigned to.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub department: String,
}

/// Progress of a task or subtask.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::InProgress => "In Progress",
            Status::Completed => "Completed",
        }
    }

    pub fn is_completed(&self) -> bool {
        *self == Status::Completed
    }

    /// Reads a stored column value. Rows written by other tools use free text
    /// such as "Done"; finished-sounding values read as `Completed`, anything
    /// else unrecognised as `Pending`. Returns `None` in the second element
    /// when the value was recognised.
    pub fn from_column(value: Option<&str>) -> (Status, Option<&str>) {
        let Some(raw) = value else {
            return (Status::default(), None);
        };
        if let Ok(status) = raw.parse() {
            return (status, None);
        }
        let status = match raw.trim().to_lowercase().as_str() {
            "done" | "complete" | "finished" | "closed" => Status::Completed,
            "started" | "ongoing" | "active" => Status::InProgress,
            _ => Status::Pending,
        };
        (status, Some(raw))
    }

    /// The status that follows this one in the dashboard's status cycle.
    pub fn next(self) -> Status {
        match self {
            Status::Pending => Status::InProgress,
            Status::InProgress => Status::Completed,
            Status::Completed => Status::Pending,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Status::Pending),
            "in progress" | "in-progress" | "in_progress" => Ok(Status::InProgress),
            "completed" => Ok(Status::Completed),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

/// Task priority. Declared in sort order: `High` sorts first.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl Priority {
    /// Reads a stored column value. Missing or unrecognised values read as
    /// `Medium`; the second element holds the unrecognised text.
    pub fn from_column(value: Option<&str>) -> (Priority, Option<&str>) {
        match value {
            None | Some("") => (Priority::default(), None),
            Some(raw) => match raw.parse() {
                Ok(p) => (p, None),
                Err(_) => (Priority::default(), Some(raw)),
            },
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(Error::InvalidPriority(s.to_string())),
        }
    }
}

/// How often a task comes back after its deadline passes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    /// A value found in the database that this version does not understand.
    /// Never produced by user input.
    Unknown(String),
}

impl Recurrence {
    pub fn as_str(&self) -> &str {
        match self {
            Recurrence::None => "None",
            Recurrence::Daily => "Daily",
            Recurrence::Weekly => "Weekly",
            Recurrence::Monthly => "Monthly",
            Recurrence::Unknown(s) => s,
        }
    }

    /// Reads a stored column value. Unrecognised values are kept as `Unknown`
    /// rather than failing the row.
    pub fn from_column(value: Option<String>) -> Recurrence {
        match value {
            None => Recurrence::None,
            Some(s) => s.parse().unwrap_or(Recurrence::Unknown(s)),
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Recurrence {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(Recurrence::None),
            "daily" => Ok(Recurrence::Daily),
            "weekly" => Ok(Recurrence::Weekly),
            "monthly" => Ok(Recurrence::Monthly),
            _ => Err(Error::InvalidRecurrence(s.to_string())),
        }
    }
}

/// A stored task.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    /// Unique identifier, assigned by the store.
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    /// Free-text label, e.g. "Research".
    pub category: Option<String>,
    pub status: Status,
    /// Id of the employee the task is assigned to.
    pub assigned_to: i64,
    pub deadline: NaiveDate,
    pub priority: Priority,
    pub recurrence: Recurrence,
    /// Name of the attached file. Contents are never stored.
    pub file_path: Option<String>,
    /// Date the follow-up of this recurring task was created, if it has been.
    pub rolled_over_on: Option<NaiveDate>,
}

/// A checklist item belonging to a task.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Subtask {
    pub id: i64,
    pub task_id: i64,
    pub title: String,
    pub status: Status,
}

/// Everything needed to insert a task. New tasks always start `Pending`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub assigned_to: i64,
    pub deadline: NaiveDate,
    pub priority: Priority,
    pub recurrence: Recurrence,
    pub file_path: Option<String>,
    /// Titles of subtasks created together with the task.
    pub subtasks: Vec<String>,
}

impl NewTask {
    /// The follow-up of a recurring task: same fields, a new deadline, no file
    /// and no subtasks.
    pub fn follow_up(task: &Task, deadline: NaiveDate) -> NewTask {
        NewTask {
            title: task.title.clone(),
            description: task.description.clone(),
            category: task.category.clone(),
            assigned_to: task.assigned_to,
            deadline,
            priority: task.priority,
            recurrence: task.recurrence.clone(),
            file_path: None,
            subtasks: Vec::new(),
        }
    }
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|source| Error::InvalidDate {
        value: value.to_string(),
        source,
    })
}
