//! # crewtasks
//!
//! A small terminal tool for assigning tasks to employees and keeping an eye
//! on their deadlines. A CLI covers quick entry and scripting; a TUI dashboard
//! shows each employee's tasks with status bulbs and a tasks-per-employee
//! chart.
//!
//! ## Features
//!
//! *   **Status bulbs**: green, yellow or red from each task's status and
//!     remaining days, recomputed every time tasks are shown.
//! *   **Recurring tasks**: daily, weekly and monthly tasks roll over to their
//!     next deadline once the current one has passed. Rollover runs on every
//!     start and creates each follow-up once.
//! *   **Subtasks**: checklist items created with a task and completed
//!     independently.
//! *   **Attachments**: CSV and DOCX files can be attached by name, with a text
//!     preview of either.
//!
//! ## Usage
//!
//! ```bash
//! # Dashboard
//! crewtasks
//!
//! # Assign a task to employee 2
//! crewtasks add "Quarterly survey" --to 2 --deadline 2025-12-01 \
//!     --priority high --recur monthly --subtask "Draft" --subtask "Review"
//!
//! # Employee 2's tasks, most important first
//! crewtasks list 2 --by-priority
//!
//! # Update progress
//! crewtasks status 7 "in progress"
//! crewtasks subtask 12 completed
//! ```
//!
//! ## Data Storage
//!
//! Tasks live in a SQLite file in your local data directory
//! (`~/.local/share/crewtasks/tasks.db` on Linux). Override it with `--db`, the
//! `TASKS_DB` environment variable, or `db_path` under `[storage]` in
//! `~/.config/crewtasks/config.toml`.

use std::io;
use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing::info;

use crewtasks::commands::*;
use crewtasks::config::Config;
use crewtasks::logging;
use crewtasks::models::Status;
use crewtasks::recurrence::expand_recurring;
use crewtasks::storage::SqliteStore;
use crewtasks::tui::run_tui;

#[derive(Parser)]
#[command(name = "crewtasks")]
#[command(about = "Assign and track employee tasks", long_about = None)]
struct Cli {
    /// Path to the task database
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Assign a new task to an employee
    Add {
        /// Task title (quoted if it has spaces)
        title: String,
        /// Employee id
        #[arg(short, long = "to")]
        to: Option<i64>,
        /// Deadline in YYYY-MM-DD
        #[arg(short, long)]
        deadline: String,
        /// Longer description
        #[arg(short = 'D', long)]
        description: Option<String>,
        /// Category label
        #[arg(short, long)]
        category: Option<String>,
        /// Priority (low, medium, high)
        #[arg(short, long)]
        priority: Option<String>,
        /// Recurrence (none, daily, weekly, monthly)
        #[arg(short, long)]
        recur: Option<String>,
        /// Subtask title, repeatable
        #[arg(short, long = "subtask")]
        subtask: Vec<String>,
        /// Supporting file (CSV or DOCX); only its name is stored
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// List an employee's tasks
    List {
        /// Employee id
        employee: i64,
        /// Order by priority (High, Medium, Low)
        #[arg(short = 'p', long)]
        by_priority: bool,
    },
    /// Update a task's status
    Status {
        id: i64,
        /// Pending, "In Progress" or Completed
        status: Status,
    },
    /// Update a subtask's status
    Subtask {
        id: i64,
        /// Pending, "In Progress" or Completed
        status: Status,
    },
    /// List employees
    Employees,
    /// Show tasks assigned per employee
    Summary,
    /// Preview a supporting file without attaching it
    Preview {
        path: PathBuf,
    },
    /// Delete all tasks and subtasks
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
    /// Open interactive dashboard
    Ui,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if cli.verbose {
        config.log_filter = "debug".to_string();
    }

    match &cli.command {
        Some(Commands::Completions { shell }) => {
            let shell_enum = match shell.as_str() {
                "bash" => Shell::Bash,
                "zsh" => Shell::Zsh,
                "fish" => Shell::Fish,
                "powershell" => Shell::PowerShell,
                "elvish" => Shell::Elvish,
                _ => anyhow::bail!("Unsupported shell: {}", shell),
            };
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "crewtasks", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::Preview { path }) => {
            logging::init(&config.log_filter);
            cmd_preview(path)?;
            return Ok(());
        }
        Some(Commands::Ui) | None => logging::init("off"),
        Some(_) => logging::init(&config.log_filter),
    }

    let store = SqliteStore::open(&config.db_path)
        .with_context(|| format!("opening {}", config.db_path.display()))?;
    let today = Local::now().date_naive();
    let created = expand_recurring(&store, today).context("rolling over recurring tasks")?;
    if !created.is_empty() {
        info!(count = created.len(), "created follow-up tasks");
    }

    match cli.command {
        Some(Commands::Add { title, to, deadline, description, category, priority, recur, subtask, file }) => {
            let input = AddTask {
                title,
                description,
                category,
                assigned_to: to,
                deadline,
                priority,
                recurrence: recur,
                subtasks: subtask,
                file,
            };
            cmd_add(&store, input, today, false)?;
        }
        Some(Commands::List { employee, by_priority }) => cmd_list(&store, employee, by_priority, today)?,
        Some(Commands::Status { id, status }) => cmd_status(&store, id, status, false)?,
        Some(Commands::Subtask { id, status }) => cmd_subtask_status(&store, id, status, false)?,
        Some(Commands::Employees) => cmd_employees(&store)?,
        Some(Commands::Summary) => cmd_summary(&store)?,
        Some(Commands::Reset { force }) => cmd_reset(&store, force)?,
        Some(Commands::Completions { .. }) | Some(Commands::Preview { .. }) => {}
        Some(Commands::Ui) | None => {
            run_tui(&store).map_err(|e| anyhow::anyhow!("Error running TUI: {}", e))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_ids_parse_as_i64() {
        let cli = Cli::try_parse_from(["crewtasks", "status", "7", "completed"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Status { id: 7, status: Status::Completed })));

        let cli = Cli::try_parse_from(["crewtasks", "subtask", "12", "in progress"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Subtask { id: 12, status: Status::InProgress })));
    }

    #[test]
    fn test_status_id_beyond_i64_is_rejected() {
        let too_big = (i64::MAX as u64 + 1).to_string();
        assert!(Cli::try_parse_from(["crewtasks", "status", too_big.as_str(), "completed"]).is_err());
        assert!(Cli::try_parse_from(["crewtasks", "subtask", too_big.as_str(), "completed"]).is_err());
    }
}
