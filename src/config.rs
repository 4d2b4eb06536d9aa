//! Run configuration.
//!
//! The three required values (Galaxy URL, username, API key) come from the
//! command line. Everything else has a default that can be overridden from
//! the environment:
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `WORKFLOW_CHECKER_SUITE_NAME` | Name of the xUnit test suite | `workflow_checker` |
//! | `WORKFLOW_CHECKER_WORK_DIR` | Directory commands run in and relative paths resolve against | current directory |
//! | `WORKFLOW_CHECKER_IDS_FILE` | File the published workflow ids are downloaded to | `ids.txt` |
//! | `WORKFLOW_CHECKER_CACHE_IDS` | Reuse an existing ids file instead of downloading again | `false` |
//!
//! A `Config` is built once and passed to the runner and checker; there is no
//! global configuration.

use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_SUITE_NAME: &str = "workflow_checker";
pub const DEFAULT_IDS_FILE: &str = "ids.txt";

pub const ENV_SUITE_NAME: &str = "WORKFLOW_CHECKER_SUITE_NAME";
pub const ENV_WORK_DIR: &str = "WORKFLOW_CHECKER_WORK_DIR";
pub const ENV_IDS_FILE: &str = "WORKFLOW_CHECKER_IDS_FILE";
pub const ENV_CACHE_IDS: &str = "WORKFLOW_CHECKER_CACHE_IDS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a boolean (true/false/1/0/yes/no), got '{value}'")]
    InvalidBool { var: &'static str, value: String },

    #[error("{var} must not be empty")]
    Empty { var: &'static str },

    #[error("could not determine the current directory: {0}")]
    CurrentDir(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub galaxy_url: String,
    pub username: String,
    pub api_key: String,
    pub suite_name: String,
    pub work_dir: PathBuf,
    /// Relative paths resolve against `work_dir`.
    pub ids_file: PathBuf,
    pub cache_published_ids: bool,
}

impl Config {
    /// Config with defaults for everything except the required values.
    pub fn new(galaxy_url: impl Into<String>, username: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            galaxy_url: galaxy_url.into(),
            username: username.into(),
            api_key: api_key.into(),
            suite_name: DEFAULT_SUITE_NAME.to_string(),
            work_dir: PathBuf::from("."),
            ids_file: PathBuf::from(DEFAULT_IDS_FILE),
            cache_published_ids: false,
        }
    }

    /// Apply overrides from the process environment.
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from `lookup`. Unset variables keep their defaults,
    /// an unset work dir becomes the current directory.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup(ENV_SUITE_NAME) {
            self.suite_name = non_empty(ENV_SUITE_NAME, name)?;
        }
        self.work_dir = match lookup(ENV_WORK_DIR) {
            Some(dir) => PathBuf::from(non_empty(ENV_WORK_DIR, dir)?),
            None => std::env::current_dir()?,
        };
        if let Some(file) = lookup(ENV_IDS_FILE) {
            self.ids_file = PathBuf::from(non_empty(ENV_IDS_FILE, file)?);
        }
        if let Some(value) = lookup(ENV_CACHE_IDS) {
            self.cache_published_ids = parse_bool(ENV_CACHE_IDS, &value)?;
        }
        Ok(self)
    }

    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    /// `{galaxy_url}/workflow/list_published`
    pub fn published_list_url(&self) -> String {
        format!("{}/workflow/list_published", self.galaxy_url.trim_end_matches('/'))
    }
}

fn non_empty(var: &'static str, value: String) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        Err(ConfigError::Empty { var })
    } else {
        Ok(value)
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var,
            value: value.to_string(),
        }),
    }
}
