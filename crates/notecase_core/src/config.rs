//! Runtime configuration resolved from the environment.
//!
//! # Responsibility
//! - Locate the data directory, log directory and log level.
//! - Carry the storage quota applied to the durable store.
//!
//! # Invariants
//! - Resolution never touches the file system; `ensure_dirs()` does.

use crate::logging::default_log_level;
use crate::store::memory_store::DEFAULT_QUOTA_BYTES;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "NOTECASE_DATA_DIR";
pub const LOG_DIR_ENV: &str = "NOTECASE_LOG_DIR";
pub const LOG_LEVEL_ENV: &str = "NOTECASE_LOG_LEVEL";
pub const QUOTA_ENV: &str = "NOTECASE_QUOTA_BYTES";

const DEFAULT_DIR_NAME: &str = ".notecase";
const DATABASE_FILE_NAME: &str = "notecase.sqlite3";

#[derive(Debug)]
pub enum ConfigError {
    /// Neither the data dir override nor `HOME` is set.
    MissingHome,
    InvalidNumber { var: &'static str, value: String },
    CreateDir { path: PathBuf, source: io::Error },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingHome => write!(f, "HOME not set; set {DATA_DIR_ENV} explicitly"),
            Self::InvalidNumber { var, value } => {
                write!(f, "{var} must be a non-negative integer, got `{value}`")
            }
            Self::CreateDir { path, source } => {
                write!(f, "failed to create directory `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Resolved application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
    pub storage_quota_bytes: usize,
}

impl AppConfig {
    /// Resolves configuration from `NOTECASE_*` variables and `HOME`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults rooted at `data_dir`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            log_dir: data_dir.join("logs"),
            data_dir,
            log_level: default_log_level().to_string(),
            storage_quota_bytes: DEFAULT_QUOTA_BYTES,
        }
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let data_dir = match lookup(DATA_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => {
                let home = lookup("HOME").ok_or(ConfigError::MissingHome)?;
                PathBuf::from(home).join(DEFAULT_DIR_NAME)
            }
        };

        let mut config = Self::with_data_dir(data_dir);
        if let Some(dir) = lookup(LOG_DIR_ENV) {
            config.log_dir = PathBuf::from(dir);
        }
        if let Some(level) = lookup(LOG_LEVEL_ENV) {
            config.log_level = level.trim().to_string();
        }
        if let Some(value) = lookup(QUOTA_ENV) {
            config.storage_quota_bytes =
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidNumber {
                        var: QUOTA_ENV,
                        value: value.clone(),
                    })?;
        }
        Ok(config)
    }

    /// Path of the SQLite file backing the durable store.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE_NAME)
    }

    /// Creates the data and log directories when missing.
    pub fn ensure_dirs(&self) -> Result<(), ConfigError> {
        for dir in [&self.data_dir, &self.log_dir] {
            create_dir(dir)?;
        }
        Ok(())
    }
}

fn create_dir(path: &Path) -> Result<(), ConfigError> {
    std::fs::create_dir_all(path).map_err(|source| ConfigError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}
