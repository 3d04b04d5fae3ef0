pub mod attachment;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod query;
pub mod recurrence;
pub mod status;
pub mod storage;
pub mod tui;
