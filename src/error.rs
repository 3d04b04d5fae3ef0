use chrono::NaiveDate;
use thiserror::Error;

/// Errors returned by the store, the expander and the commands.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("employee {0} not found")]
    EmployeeNotFound(i64),

    #[error("task {0} not found")]
    TaskNotFound(i64),

    #[error("subtask {0} not found")]
    SubtaskNotFound(i64),

    #[error("invalid date '{value}': {source}. Use YYYY-MM-DD.")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("deadline {0} is in the past")]
    DeadlineInPast(NaiveDate),

    #[error("invalid status '{0}'. Supported: Pending, In Progress, Completed.")]
    InvalidStatus(String),

    #[error("invalid priority '{0}'. Supported: Low, Medium, High.")]
    InvalidPriority(String),

    #[error("invalid recurrence '{0}'. Supported: None, Daily, Weekly, Monthly.")]
    InvalidRecurrence(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("docx archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("docx content error: {0}")]
    Docx(String),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
