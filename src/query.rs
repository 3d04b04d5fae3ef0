use crate::error::Result;
use crate::models::Task;
use crate::storage::TaskRepository;

/// Orders tasks High, Medium, Low. The sort is stable, so tasks of equal
/// priority keep their insertion order.
pub fn sort_by_priority(tasks: &mut [Task]) {
    tasks.sort_by_key(|t| t.priority);
}

/// Tasks assigned to `employee_id`, optionally ordered by priority.
pub fn employee_tasks(
    repo: &impl TaskRepository,
    employee_id: i64,
    by_priority: bool,
) -> Result<Vec<Task>> {
    let mut tasks = repo.tasks_for_employee(employee_id)?;
    if by_priority {
        sort_by_priority(&mut tasks);
    }
    Ok(tasks)
}

/// Number of tasks assigned to each employee, including employees with none.
pub fn task_counts(repo: &impl TaskRepository) -> Result<Vec<(String, usize)>> {
    repo.task_counts()
}
