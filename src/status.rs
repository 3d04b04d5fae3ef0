use chrono::NaiveDate;

use crate::models::{Status, Task};

/// Traffic-light indicator shown next to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bulb {
    Green,
    Yellow,
    Red,
}

impl Bulb {
    pub fn symbol(&self) -> &'static str {
        match self {
            Bulb::Green => "🟢",
            Bulb::Yellow => "🟡",
            Bulb::Red => "🔴",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Bulb::Green => "green",
            Bulb::Yellow => "yellow",
            Bulb::Red => "red",
        }
    }
}

/// Whole days from `today` until `deadline`. Negative once the deadline has
/// passed.
pub fn remaining_days(deadline: NaiveDate, today: NaiveDate) -> i64 {
    (deadline - today).num_days()
}

/// Derives the indicator for a task.
///
/// - Completed tasks are always green.
/// - Otherwise: due today or overdue is red, one or two days left is yellow,
///   anything further out is green.
pub fn status_bulb(status: Status, remaining_days: i64) -> Bulb {
    if status == Status::Completed {
        return Bulb::Green;
    }
    match remaining_days {
        d if d <= 0 => Bulb::Red,
        1 | 2 => Bulb::Yellow,
        _ => Bulb::Green,
    }
}

/// Indicator for `task` as of `today`. Must be called at render time; the
/// result depends on the date and is never stored.
pub fn task_bulb(task: &Task, today: NaiveDate) -> Bulb {
    status_bulb(task.status, remaining_days(task.deadline, today))
}

/// Human-readable remaining time, e.g. `3d`, `Today` or `2d overdue`.
pub fn describe_remaining(days: i64) -> String {
    if days < 0 {
        format!("{}d overdue", days.abs())
    } else if days == 0 {
        "Today".to_string()
    } else {
        format!("{}d", days)
    }
}
