//! Runtime configuration.
//!
//! Settings come from an optional YAML file and are then overridden by
//! command-line flags. Every field has a default, so a file only needs the
//! keys it changes.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::report::OutputFormat;

const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

/// Configuration loading and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse configuration file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Path to the assignment table
    pub table: PathBuf,
    pub format: OutputFormat,
    /// Worker threads for query resolution; 0 resolves on the main thread
    pub jobs: usize,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            table: PathBuf::from("routing-data.txt"),
            format: OutputFormat::Text,
            jobs: 0,
            log_level: "info".to_string(),
        }
    }
}

/// Values given on the command line that replace file settings
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub table: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub jobs: Option<usize>,
    pub log_level: Option<String>,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("table path cannot be empty".to_string()));
        }

        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "unknown log_level '{}', expected one of {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: CliOverrides) {
        if let Some(table) = overrides.table {
            self.table = table;
        }
        if let Some(format) = overrides.format {
            self.format = format;
        }
        if let Some(jobs) = overrides.jobs {
            self.jobs = jobs;
        }
        if let Some(log_level) = overrides.log_level {
            self.log_level = log_level;
        }
    }
}

/// Load and parse configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<Config, ConfigError> {
    let file = File::open(config_path)?;
    let config: Config = serde_yaml::from_reader(file)?;
    config.validate()?;
    Ok(config)
}

/// Build the effective configuration from an optional file plus CLI overrides
pub fn resolve_config(
    config_path: Option<&Path>,
    overrides: CliOverrides,
) -> Result<Config, ConfigError> {
    let mut config = match config_path {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    config.apply_overrides(overrides);
    config.validate()?;
    Ok(config)
}
