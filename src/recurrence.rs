use chrono::{Days, Months, NaiveDate};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::{NewTask, Recurrence};
use crate::storage::TaskRepository;

/// Deadline of the next occurrence after `deadline`.
///
/// Monthly steps are calendar months, clamped to the end of shorter months
/// (Jan 31 becomes Feb 28 or 29). Returns `None` for `None` and unknown
/// recurrences.
pub fn next_deadline(recurrence: &Recurrence, deadline: NaiveDate) -> Option<NaiveDate> {
    match recurrence {
        Recurrence::Daily => deadline.checked_add_days(Days::new(1)),
        Recurrence::Weekly => deadline.checked_add_days(Days::new(7)),
        Recurrence::Monthly => deadline.checked_add_months(Months::new(1)),
        Recurrence::None | Recurrence::Unknown(_) => None,
    }
}

/// Creates the follow-up of every recurring task whose deadline is before
/// `today` and which has not rolled over yet.
///
/// Each follow-up copies the source's title, description, category, assignee,
/// priority and recurrence, with the deadline advanced one period from the
/// source's deadline. The source is marked with `today` so a later run skips
/// it. Returns the ids of the created tasks.
pub fn expand_recurring(repo: &impl TaskRepository, today: NaiveDate) -> Result<Vec<i64>> {
    let mut created = Vec::new();
    let candidates = repo.recurring_tasks()?;

    for task in &candidates {
        if task.deadline >= today || task.rolled_over_on.is_some() {
            continue;
        }
        let Some(deadline) = next_deadline(&task.recurrence, task.deadline) else {
            warn!(id = task.id, recurrence = %task.recurrence, "skipping task with unsupported recurrence");
            continue;
        };
        let id = repo.roll_over(task.id, &NewTask::follow_up(task, deadline), today)?;
        info!(source = task.id, id, %deadline, "recurring task rolled over");
        created.push(id);
    }

    debug!(checked = candidates.len(), created = created.len(), "recurrence expansion finished");
    Ok(created)
}
