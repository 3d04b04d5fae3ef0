use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::{parse_date, Employee, NewTask, Priority, Recurrence, Status, Subtask, Task};

/// Roster written into an empty `employees` table.
pub const DEFAULT_EMPLOYEES: [(&str, &str); 10] = [
    ("Zaedul Islam", "IT manager"),
    ("Ehsan", "Researcher"),
    ("Rakib", "Finance and Research"),
    ("Baki Billah", "Research"),
    ("Dilruba", "Marketing"),
    ("Hasnain", "Statistician"),
    ("Tanzila", "Customer Support"),
    ("Thrina", "Research Supervisor"),
    ("Faysal", "IT & Operations"),
    ("Suraiya", "HR"),
];

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS employees (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    department TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT,
    category TEXT,
    status TEXT DEFAULT 'Pending',
    assigned_to INTEGER,
    deadline DATE,
    priority TEXT,
    recurrence TEXT DEFAULT 'None',
    file_path TEXT,
    rolled_over_on DATE,
    FOREIGN KEY (assigned_to) REFERENCES employees (id)
);
CREATE TABLE IF NOT EXISTS subtasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    task_id INTEGER,
    title TEXT NOT NULL,
    status TEXT DEFAULT 'Pending',
    FOREIGN KEY (task_id) REFERENCES tasks (id)
);
";

const TASK_COLUMNS: &str = "id, title, description, category, status, assigned_to, deadline, \
                            priority, recurrence, file_path, rolled_over_on";

/// The operations the rest of the crate needs from persistent storage.
///
/// Commands, the dashboard and the recurrence expander all take a
/// `&impl TaskRepository` instead of opening the database themselves.
pub trait TaskRepository {
    /// All employees in id order.
    fn employees(&self) -> Result<Vec<Employee>>;

    fn employee(&self, id: i64) -> Result<Option<Employee>>;

    /// Inserts a task together with its subtasks and returns the new task id.
    fn insert_task(&self, task: &NewTask) -> Result<i64>;

    fn task(&self, id: i64) -> Result<Option<Task>>;

    /// All tasks in insertion order.
    fn tasks(&self) -> Result<Vec<Task>>;

    /// Tasks whose assignee is exactly `employee_id`, in insertion order.
    fn tasks_for_employee(&self, employee_id: i64) -> Result<Vec<Task>>;

    fn update_task_status(&self, id: i64, status: Status) -> Result<()>;

    fn subtasks(&self, task_id: i64) -> Result<Vec<Subtask>>;

    fn update_subtask_status(&self, id: i64, status: Status) -> Result<()>;

    /// Tasks with a recurrence other than `None`, in insertion order.
    fn recurring_tasks(&self) -> Result<Vec<Task>>;

    /// Inserts the follow-up of `source_id` and marks the source as rolled
    /// over on `today`, atomically. Returns the follow-up's id.
    fn roll_over(&self, source_id: i64, follow_up: &NewTask, today: NaiveDate) -> Result<i64>;

    /// `(employee name, task count)` for every employee, in employee id order.
    fn task_counts(&self) -> Result<Vec<(String, usize)>>;

    /// Deletes every task and subtask. Employees are kept.
    fn reset(&self) -> Result<()>;
}

/// SQLite-backed [`TaskRepository`].
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates the database at `path`, bringing the schema up to date
    /// and seeding the employee roster if it is empty.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        debug!(path = %path.display(), "opening task database");
        Self::init(Connection::open(path)?)
    }

    /// Opens a fresh in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        conn.execute_batch(SCHEMA)?;
        // Databases created by older versions lack these columns.
        ensure_column(&conn, "tasks", "recurrence", "TEXT DEFAULT 'None'")?;
        ensure_column(&conn, "tasks", "rolled_over_on", "DATE")?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM employees", [], |r| r.get(0))?;
        if count == 0 {
            for (name, department) in DEFAULT_EMPLOYEES {
                conn.execute(
                    "INSERT INTO employees (name, department) VALUES (?1, ?2)",
                    params![name, department],
                )?;
            }
            info!(count = DEFAULT_EMPLOYEES.len(), "seeded employee roster");
        }

        Ok(Self { conn })
    }

    fn query_tasks(&self, filter: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Vec<Task>> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks {filter} ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(args, TaskRow::read)?;
        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?.into_task()?);
        }
        Ok(tasks)
    }

    fn insert_task_row(&self, task: &NewTask) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO tasks (title, description, category, status, assigned_to, deadline, priority, recurrence, file_path)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                task.title,
                task.description,
                task.category,
                Status::Pending.as_str(),
                task.assigned_to,
                format_date(task.deadline),
                task.priority.as_str(),
                task.recurrence.as_str(),
                task.file_path,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        for title in &task.subtasks {
            self.conn.execute(
                "INSERT INTO subtasks (task_id, title, status) VALUES (?1, ?2, ?3)",
                params![id, title, Status::Pending.as_str()],
            )?;
        }
        Ok(id)
    }
}

impl TaskRepository for SqliteStore {
    fn employees(&self) -> Result<Vec<Employee>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, department FROM employees ORDER BY id")?;
        let rows = stmt.query_map([], read_employee)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn employee(&self, id: i64) -> Result<Option<Employee>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, name, department FROM employees WHERE id = ?1",
                params![id],
                read_employee,
            )
            .optional()?)
    }

    fn insert_task(&self, task: &NewTask) -> Result<i64> {
        let tx = self.conn.unchecked_transaction()?;
        let id = self.insert_task_row(task)?;
        tx.commit()?;
        info!(id, title = %task.title, assigned_to = task.assigned_to, "task added");
        Ok(id)
    }

    fn task(&self, id: i64) -> Result<Option<Task>> {
        Ok(self.query_tasks("WHERE id = ?1", params![id])?.into_iter().next())
    }

    fn tasks(&self) -> Result<Vec<Task>> {
        self.query_tasks("", params![])
    }

    fn tasks_for_employee(&self, employee_id: i64) -> Result<Vec<Task>> {
        let tasks = self.query_tasks("WHERE assigned_to = ?1", params![employee_id])?;
        debug!(employee_id, count = tasks.len(), "fetched employee tasks");
        Ok(tasks)
    }

    fn update_task_status(&self, id: i64, status: Status) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE tasks SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id],
        )?;
        if changed == 0 {
            return Err(Error::TaskNotFound(id));
        }
        info!(id, %status, "task status updated");
        Ok(())
    }

    fn subtasks(&self, task_id: i64) -> Result<Vec<Subtask>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, task_id, title, status FROM subtasks WHERE task_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![task_id], |row| {
            Ok((
                row.get::<_, i64>("id")?,
                row.get::<_, i64>("task_id")?,
                row.get::<_, String>("title")?,
                row.get::<_, Option<String>>("status")?,
            ))
        })?;
        let mut subtasks = Vec::new();
        for row in rows {
            let (id, task_id, title, status) = row?;
            subtasks.push(Subtask {
                id,
                task_id,
                title,
                status: read_status(id, status.as_deref()),
            });
        }
        Ok(subtasks)
    }

    fn update_subtask_status(&self, id: i64, status: Status) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE subtasks SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id],
        )?;
        if changed == 0 {
            return Err(Error::SubtaskNotFound(id));
        }
        info!(id, %status, "subtask status updated");
        Ok(())
    }

    fn recurring_tasks(&self) -> Result<Vec<Task>> {
        self.query_tasks("WHERE recurrence IS NOT NULL AND recurrence != 'None'", params![])
    }

    fn roll_over(&self, source_id: i64, follow_up: &NewTask, today: NaiveDate) -> Result<i64> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = self.conn.execute(
            "UPDATE tasks SET rolled_over_on = ?1 WHERE id = ?2",
            params![format_date(today), source_id],
        )?;
        if changed == 0 {
            return Err(Error::TaskNotFound(source_id));
        }
        let id = self.insert_task_row(follow_up)?;
        tx.commit()?;
        Ok(id)
    }

    fn task_counts(&self) -> Result<Vec<(String, usize)>> {
        let mut stmt = self.conn.prepare(
            "SELECT employees.name, COUNT(tasks.id)
             FROM employees
             LEFT JOIN tasks ON tasks.assigned_to = employees.id
             GROUP BY employees.id
             ORDER BY employees.id",
        )?;
        let rows = stmt.query_map([], |row| {
            let count: i64 = row.get(1)?;
            Ok((row.get::<_, String>(0)?, count.max(0) as usize))
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn reset(&self) -> Result<()> {
        self.conn
            .execute_batch("DELETE FROM subtasks; DELETE FROM tasks;")?;
        info!("all tasks deleted");
        Ok(())
    }
}

/// Raw column values of a task row, converted to [`Task`] outside of
/// rusqlite's row callback so date and enum errors keep their own variants.
struct TaskRow {
    id: i64,
    title: String,
    description: Option<String>,
    category: Option<String>,
    status: Option<String>,
    assigned_to: i64,
    deadline: String,
    priority: Option<String>,
    recurrence: Option<String>,
    file_path: Option<String>,
    rolled_over_on: Option<String>,
}

impl TaskRow {
    fn read(row: &Row) -> rusqlite::Result<TaskRow> {
        Ok(TaskRow {
            id: row.get("id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            category: row.get("category")?,
            status: row.get("status")?,
            assigned_to: row.get("assigned_to")?,
            deadline: row.get("deadline")?,
            priority: row.get("priority")?,
            recurrence: row.get("recurrence")?,
            file_path: row.get("file_path")?,
            rolled_over_on: row.get("rolled_over_on")?,
        })
    }

    fn into_task(self) -> Result<Task> {
        let (priority, unknown) = Priority::from_column(self.priority.as_deref());
        if let Some(raw) = unknown {
            warn!(task = self.id, priority = raw, "unrecognised stored priority, reading as Medium");
        }
        let rolled_over_on = match self.rolled_over_on.as_deref() {
            None => None,
            Some(d) => Some(parse_stored_date(d)?),
        };
        Ok(Task {
            id: self.id,
            title: self.title,
            description: self.description,
            category: self.category,
            status: read_status(self.id, self.status.as_deref()),
            assigned_to: self.assigned_to,
            deadline: parse_stored_date(&self.deadline)?,
            priority,
            recurrence: Recurrence::from_column(self.recurrence),
            file_path: self.file_path,
            rolled_over_on,
        })
    }
}

fn read_employee(row: &Row) -> rusqlite::Result<Employee> {
    Ok(Employee {
        id: row.get("id")?,
        name: row.get("name")?,
        department: row.get("department")?,
    })
}

fn read_status(id: i64, value: Option<&str>) -> Status {
    let (status, unknown) = Status::from_column(value);
    if let Some(raw) = unknown {
        warn!(id, status = raw, read_as = %status, "unrecognised stored status");
    }
    status
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parses a stored date. Timestamps such as `2024-01-15 00:00:00` written by
/// older versions are accepted by their date part.
fn parse_stored_date(value: &str) -> Result<NaiveDate> {
    let date_part = match value.find([' ', 'T']) {
        Some(idx) => &value[..idx],
        None => value,
    };
    parse_date(date_part).map_err(|e| match e {
        Error::InvalidDate { source, .. } => Error::InvalidDate {
            value: value.to_string(),
            source,
        },
        other => other,
    })
}

/// Adds `column` to `table` if it does not exist yet.
fn ensure_column(conn: &Connection, table: &str, column: &str, decl: &str) -> Result<()> {
    let names: Vec<String> = {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
        let rows = stmt.query_map([], |row| row.get::<_, String>("name"))?;
        rows.collect::<rusqlite::Result<_>>()?
    };
    if names.iter().any(|name| name == column) {
        return Ok(());
    }
    conn.execute_batch(&format!("ALTER TABLE {table} ADD COLUMN {column} {decl}"))?;
    info!(table, column, "added missing column");
    Ok(())
}
