use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

const APP_DIR: &str = "crewtasks";

/// Settings read from `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub storage: StorageSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct StorageSection {
    pub db_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    /// An `EnvFilter` directive such as `info` or `crewtasks=debug`.
    pub filter: Option<String>,
}

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_filter: "warn".to_string(),
        }
    }
}

impl Config {
    /// Loads the configuration: defaults, then the config file, then the
    /// `TASKS_DB` and `RUST_LOG` environment variables.
    pub fn load() -> Result<Self> {
        let file = match config_file_path() {
            Some(path) => load_file(&path)?,
            None => FileConfig::default(),
        };
        let env = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());
        Ok(Self::resolve(file, env("TASKS_DB"), env("RUST_LOG")))
    }

    /// Layers `file` and the environment overrides over the defaults.
    pub fn resolve(file: FileConfig, db_env: Option<String>, log_env: Option<String>) -> Self {
        let mut config = Config::default();
        if let Some(path) = file.storage.db_path {
            config.db_path = path;
        }
        if let Some(filter) = file.logging.filter {
            config.log_filter = filter;
        }
        if let Some(path) = db_env {
            config.db_path = PathBuf::from(path);
        }
        if let Some(filter) = log_env {
            config.log_filter = filter;
        }
        config
    }
}

/// `CREWTASKS_CONFIG`, or `config.toml` in the platform config directory.
fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("CREWTASKS_CONFIG") {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|mut p| {
        p.push(APP_DIR);
        p.push("config.toml");
        p
    })
}

/// Reads a config file. A missing file yields the defaults.
pub fn load_file(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let text = fs::read_to_string(path)?;
    parse(&text).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
}

fn parse(text: &str) -> std::result::Result<FileConfig, toml::de::Error> {
    toml::from_str(text)
}

/// `~/.local/share/crewtasks/tasks.db` on Linux, `./tasks.db` if there is no
/// data directory.
fn default_db_path() -> PathBuf {
    let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    p.push(APP_DIR);
    p.push("tasks.db");
    p
}
