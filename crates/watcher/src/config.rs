//! Watch session configuration (TOML)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::coalesce::DEFAULT_SETTLE;
use crate::ignore::compile_pattern;
use crate::{Result, WatchError};

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Directories to watch recursively
    #[serde(default)]
    pub directories: Vec<PathBuf>,

    /// Regex for files the host never reloads for
    #[serde(default)]
    pub skip_files: Option<String>,

    /// User-configurable override regex
    #[serde(default)]
    pub watcher_ignore: Option<String>,

    /// Suppress editor swap/backup files (default: false)
    #[serde(default)]
    pub ignore_editor_temp: bool,

    /// How long a woken drain keeps collecting (default: 20ms)
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Capacity of the native-to-producer channel (default: 1024)
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            directories: vec![],
            skip_files: None,
            watcher_ignore: None,
            ignore_editor_temp: false,
            settle_ms: default_settle_ms(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn default_settle_ms() -> u64 {
    DEFAULT_SETTLE.as_millis() as u64
}

fn default_channel_capacity() -> usize {
    1024
}

const MAX_SETTLE_MS: u64 = 1000;

impl WatchConfig {
    /// Load and validate configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration without validating it
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| WatchError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| WatchError::Config(e.to_string()))
    }

    /// Check ranges and that both patterns compile
    pub fn validate(&self) -> Result<()> {
        if self.directories.is_empty() {
            return Err(WatchError::Config("at least one directory is required".into()));
        }
        if self.channel_capacity == 0 {
            return Err(WatchError::Config("channel_capacity must be at least 1".into()));
        }
        if self.settle_ms > MAX_SETTLE_MS {
            return Err(WatchError::Config(format!(
                "settle_ms must be at most {} (got {})",
                MAX_SETTLE_MS, self.settle_ms
            )));
        }

        compile_pattern(self.skip_files.as_deref())?;
        compile_pattern(self.watcher_ignore.as_deref())?;
        Ok(())
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// Example configuration with every key documented
    pub fn example() -> &'static str {
        r#"# Directories watched recursively
directories = ["./app", "./lib"]

# Files never reloaded for, matched against the file name and every
# root-relative ancestor directory
skip_files = "^(.*/)?#.*#$|^(.*/)?.*~$|^(.*/)?.*\\.py[co]$"

# Extra user override, matched the same way
# watcher_ignore = "^node_modules$"

# Suppress editor swap/backup files
ignore_editor_temp = false

# Keep collecting this long after the first change (0-1000)
settle_ms = 20

# Buffer between the native source and the filter thread
channel_capacity = 1024
"#
    }
}
