use chrono::NaiveDate;
use ratatui::widgets::TableState;

use crate::commands::{validate_task, AddTask};
use crate::error::Result;
use crate::models::{Employee, Status, Subtask, Task};
use crate::query::{employee_tasks, task_counts};
use crate::status::{remaining_days, status_bulb, Bulb};
use crate::storage::TaskRepository;

#[derive(Debug, PartialEq)]
pub enum InputMode {
    Normal,
    Adding,
}

#[derive(Debug, PartialEq)]
pub enum ViewMode {
    Tasks,
    Chart,
}

/// Steps of the "Add Task" wizard, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddStep {
    #[default]
    Title,
    Description,
    Category,
    Deadline,
    Priority,
    Recurrence,
    Subtasks,
}

impl AddStep {
    pub fn prompt(&self) -> &'static str {
        match self {
            AddStep::Title => "Add Task: Enter Title",
            AddStep::Description => "Add Task: Enter Description (Optional)",
            AddStep::Category => "Add Task: Enter Category (Optional)",
            AddStep::Deadline => "Add Task: Enter Deadline (YYYY-MM-DD)",
            AddStep::Priority => "Add Task: Enter Priority (Low/Medium/High)",
            AddStep::Recurrence => "Add Task: Enter Recurrence (None/Daily/Weekly/Monthly)",
            AddStep::Subtasks => "Add Task: Enter Subtasks, comma separated (Optional)",
        }
    }

    fn next(self) -> Option<AddStep> {
        match self {
            AddStep::Title => Some(AddStep::Description),
            AddStep::Description => Some(AddStep::Category),
            AddStep::Category => Some(AddStep::Deadline),
            AddStep::Deadline => Some(AddStep::Priority),
            AddStep::Priority => Some(AddStep::Recurrence),
            AddStep::Recurrence => Some(AddStep::Subtasks),
            AddStep::Subtasks => None,
        }
    }
}

/// State for the multi-step "Add Task" wizard.
#[derive(Debug, Default)]
pub struct AddState {
    pub input: AddTask,
    pub step: AddStep,
}

pub struct App<'a, R: TaskRepository> {
    repo: &'a R,
    /// Read on every draw and every add, so a dashboard left open past
    /// midnight picks up the new day.
    clock: Box<dyn Fn() -> NaiveDate + 'a>,
    pub employees: Vec<Employee>,
    pub employee_idx: usize,
    pub tasks: Vec<Task>,
    /// Subtasks of the selected task.
    pub subtasks: Vec<Subtask>,
    pub counts: Vec<(String, usize)>,
    pub state: TableState,
    pub view_mode: ViewMode,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub add_state: AddState,
    pub by_priority: bool,
    /// Last success or error message, shown in the help bar.
    pub message: Option<String>,
}

impl<'a, R: TaskRepository> App<'a, R> {
    /// Creates the dashboard state and loads the first employee's tasks.
    pub fn new(repo: &'a R, clock: impl Fn() -> NaiveDate + 'a) -> Result<Self> {
        let employees = repo.employees()?;
        let mut app = App {
            repo,
            clock: Box::new(clock),
            employees,
            employee_idx: 0,
            tasks: Vec::new(),
            subtasks: Vec::new(),
            counts: Vec::new(),
            state: TableState::default(),
            view_mode: ViewMode::Tasks,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            add_state: AddState::default(),
            by_priority: false,
            message: None,
        };
        app.reload();
        Ok(app)
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    /// Remaining days and bulb of a task as of the clock's current date.
    pub fn indicator(&self, task: &Task) -> (i64, Bulb) {
        let days_left = remaining_days(task.deadline, self.today());
        (days_left, status_bulb(task.status, days_left))
    }

    pub fn current_employee(&self) -> Option<&Employee> {
        self.employees.get(self.employee_idx)
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.state.selected().and_then(|i| self.tasks.get(i))
    }

    /// Reloads tasks, subtasks and chart data. Errors go to the message line.
    pub fn reload(&mut self) {
        if let Err(e) = self.try_reload() {
            self.message = Some(format!("Error: {}", e));
        }
    }

    fn try_reload(&mut self) -> Result<()> {
        self.tasks = match self.current_employee() {
            Some(e) => employee_tasks(self.repo, e.id, self.by_priority)?,
            None => Vec::new(),
        };

        if self.tasks.is_empty() {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= self.tasks.len() {
                self.state.select(Some(self.tasks.len() - 1));
            }
        } else {
            self.state.select(Some(0));
        }

        self.reload_subtasks()?;
        self.counts = task_counts(self.repo)?;
        Ok(())
    }

    fn reload_subtasks(&mut self) -> Result<()> {
        self.subtasks = match self.selected_task() {
            Some(t) => self.repo.subtasks(t.id)?,
            None => Vec::new(),
        };
        Ok(())
    }

    /// Selects the next task in the list.
    pub fn next(&mut self) {
        if self.tasks.is_empty() { return; }
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.tasks.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
        self.refresh_subtasks();
    }

    /// Selects the previous task in the list.
    pub fn previous(&mut self) {
        if self.tasks.is_empty() { return; }
        let i = match self.state.selected() {
            Some(0) | None => self.tasks.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
        self.refresh_subtasks();
    }

    fn refresh_subtasks(&mut self) {
        if let Err(e) = self.reload_subtasks() {
            self.message = Some(format!("Error: {}", e));
        }
    }

    /// Shows the next employee's tasks.
    pub fn next_employee(&mut self) {
        if self.employees.is_empty() { return; }
        self.employee_idx = (self.employee_idx + 1) % self.employees.len();
        self.state.select(None);
        self.reload();
    }

    /// Shows the previous employee's tasks.
    pub fn previous_employee(&mut self) {
        if self.employees.is_empty() { return; }
        self.employee_idx = (self.employee_idx + self.employees.len() - 1) % self.employees.len();
        self.state.select(None);
        self.reload();
    }

    /// Advances the selected task to its next status.
    pub fn cycle_status(&mut self) {
        let Some((id, status)) = self.selected_task().map(|t| (t.id, t.status.next())) else {
            return;
        };
        self.message = Some(match self.repo.update_task_status(id, status) {
            Ok(()) => format!("Task {} marked as {}.", id, status),
            Err(e) => format!("Error: {}", e),
        });
        self.reload();
    }

    /// Marks the selected task's first unfinished subtask as completed.
    pub fn complete_next_subtask(&mut self) {
        let Some(id) = self
            .subtasks
            .iter()
            .find(|s| !s.status.is_completed())
            .map(|s| s.id)
        else {
            return;
        };
        self.message = Some(match self.repo.update_subtask_status(id, Status::Completed) {
            Ok(()) => format!("Subtask {} completed.", id),
            Err(e) => format!("Error: {}", e),
        });
        self.refresh_subtasks();
    }

    /// Toggles ordering by priority.
    pub fn toggle_priority_sort(&mut self) {
        self.by_priority = !self.by_priority;
        self.reload();
    }

    /// Toggles between the task list and the chart.
    pub fn toggle_view(&mut self) {
        self.view_mode = match self.view_mode {
            ViewMode::Tasks => ViewMode::Chart,
            ViewMode::Chart => ViewMode::Tasks,
        };
    }

    /// Starts the "Add Task" wizard for the current employee.
    pub fn start_add(&mut self) {
        let Some(employee_id) = self.current_employee().map(|e| e.id) else {
            self.message = Some("No employees available for task assignment.".to_string());
            return;
        };
        self.input_mode = InputMode::Adding;
        self.add_state = AddState::default();
        self.add_state.input.assigned_to = Some(employee_id);
        self.input_buffer.clear();
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
    }

    /// Stores the current wizard answer and moves on, creating the task after
    /// the last step.
    pub fn handle_input(&mut self) {
        if self.input_mode != InputMode::Adding { return; }
        let value = std::mem::take(&mut self.input_buffer);
        let trimmed = value.trim();
        let optional = if trimmed.is_empty() { None } else { Some(trimmed.to_string()) };
        let input = &mut self.add_state.input;

        match self.add_state.step {
            AddStep::Title => {
                if trimmed.is_empty() {
                    self.message = Some("Task Title is required!".to_string());
                    return;
                }
                input.title = trimmed.to_string();
            }
            AddStep::Description => input.description = optional,
            AddStep::Category => input.category = optional,
            AddStep::Deadline => {
                if trimmed.is_empty() {
                    return;
                }
                input.deadline = trimmed.to_string();
            }
            AddStep::Priority => input.priority = optional,
            AddStep::Recurrence => input.recurrence = optional,
            AddStep::Subtasks => {
                input.subtasks = trimmed.split(',').map(str::to_string).collect();
            }
        }

        match self.add_state.step.next() {
            Some(step) => self.add_state.step = step,
            None => self.finish_add(),
        }
    }

    fn finish_add(&mut self) {
        let input = std::mem::take(&mut self.add_state.input);
        let title = input.title.clone();
        let result = validate_task(self.repo, input, self.today(), true)
            .and_then(|task| self.repo.insert_task(&task));
        self.message = Some(match result {
            Ok(id) => format!("Task '{}' added (id = {}).", title, id),
            Err(e) => format!("Error: {}", e),
        });
        self.input_mode = InputMode::Normal;
        self.add_state = AddState::default();
        self.reload();
    }
}
