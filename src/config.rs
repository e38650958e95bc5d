//! Configuration loaded from `$HOME/.dealflow/rc`
//!
//! The rc file is a list of `key=value` lines; blank lines and lines starting
//! with `#` are ignored. Recognized keys:
//!
//! - `data.location` - database path, relative paths resolve against the rc
//!   file's directory
//! - `log.level` - default log filter when `RUST_LOG` is not set
//!
//! `DEALFLOW_DB` overrides `data.location`.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable overriding the database location
pub const DB_ENV_VAR: &str = "DEALFLOW_DB";

const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_location: PathBuf,
    pub log_level: String,
}

impl Config {
    /// Directory holding the rc file and the default database
    pub fn base_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".dealflow"))
    }

    /// Path of the rc file
    pub fn rc_path() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("rc"))
    }

    /// Load configuration from the rc file (if any) and the environment
    pub fn load() -> Result<Self> {
        let rc_path = Self::rc_path()?;
        let mut config = if rc_path.exists() {
            let contents = std::fs::read_to_string(&rc_path)
                .with_context(|| format!("Failed to read config file: {}", rc_path.display()))?;
            Self::parse(&contents, &rc_path)?
        } else {
            Self::defaults(&rc_path)
        };

        if let Ok(path) = std::env::var(DB_ENV_VAR) {
            if !path.trim().is_empty() {
                config.data_location = PathBuf::from(path.trim());
            }
        }

        Ok(config)
    }

    fn defaults(rc_path: &Path) -> Self {
        let dir = rc_path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self {
            data_location: dir.join("dealflow.db"),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }

    /// Parse rc file contents. `rc_path` anchors relative data locations.
    pub fn parse(contents: &str, rc_path: &Path) -> Result<Self> {
        let mut config = Self::defaults(rc_path);

        for (lineno, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (key, value) = line
                .split_once('=')
                .with_context(|| format!("{}:{}: expected key=value", rc_path.display(), lineno + 1))?;
            let (key, value) = (key.trim(), value.trim());

            match key {
                "data.location" => {
                    let path = PathBuf::from(value);
                    config.data_location = if path.is_relative() {
                        rc_path.parent().map(|dir| dir.join(&path)).unwrap_or(path)
                    } else {
                        path
                    };
                }
                "log.level" => config.log_level = value.to_string(),
                other => log::warn!("ignoring unknown config key '{}'", other),
            }
        }

        Ok(config)
    }
}
