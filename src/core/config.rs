/*!
 * File Table Configuration
 *
 * Capacities for the open file table and per-process descriptor tables.
 */

use super::errors::KernelError;
use super::limits::{MAX_FDS_PER_PROCESS, MAX_OPEN_FILES, MIN_FDS_PER_PROCESS};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Environment variable overriding the open file table capacity
pub const ENV_MAX_OPEN_FILES: &str = "KERNEL_MAX_OPEN_FILES";

/// Environment variable overriding the descriptor table capacity
pub const ENV_MAX_FDS: &str = "KERNEL_MAX_FDS";

/// Environment variable naming a JSON configuration file
pub const ENV_CONFIG_FILE: &str = "KERNEL_CONFIG";

/// Capacities for the file tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default, deny_unknown_fields)]
pub struct FileTableConfig {
    /// System-wide open file table slots (default: 128)
    pub max_open_files: usize,

    /// Descriptor slots per process (default: 128)
    pub max_descriptors: usize,
}

impl FileTableConfig {
    /// Create default configuration
    pub const fn new() -> Self {
        Self {
            max_open_files: MAX_OPEN_FILES,
            max_descriptors: MAX_FDS_PER_PROCESS,
        }
    }

    /// Explicit capacities
    pub const fn with_capacities(max_open_files: usize, max_descriptors: usize) -> Self {
        Self {
            max_open_files,
            max_descriptors,
        }
    }

    /// Small tables, useful for exercising exhaustion paths
    pub const fn tiny() -> Self {
        Self::with_capacities(8, 8)
    }

    /// Default configuration with environment overrides applied
    ///
    /// Environment variables:
    /// - KERNEL_MAX_OPEN_FILES: open file table capacity
    /// - KERNEL_MAX_FDS: descriptor table capacity
    pub fn from_env() -> Self {
        Self::new().with_env_overrides()
    }

    /// Parse a JSON configuration; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, KernelError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| KernelError::Configuration(format!("invalid configuration JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration for the kernel binary
    ///
    /// Starts from the JSON file named by KERNEL_CONFIG when set, then
    /// applies the capacity environment overrides.
    pub fn load() -> Result<Self, KernelError> {
        let base = match std::env::var(ENV_CONFIG_FILE) {
            Ok(path) => {
                let json = std::fs::read_to_string(&path).map_err(|e| {
                    KernelError::Configuration(format!("cannot read {}: {}", path, e))
                })?;
                Self::from_json(&json)?
            }
            Err(_) => Self::new(),
        };
        let config = base.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn with_env_overrides(self) -> Self {
        let mut config = self;
        if let Some(value) = read_env_usize(ENV_MAX_OPEN_FILES) {
            config.max_open_files = value;
        }
        if let Some(value) = read_env_usize(ENV_MAX_FDS) {
            config.max_descriptors = value;
        }
        config
    }

    /// Reject capacities the tables cannot work with
    pub fn validate(&self) -> Result<(), KernelError> {
        if self.max_open_files == 0 {
            return Err(KernelError::Configuration(
                "max_open_files must be greater than zero".into(),
            ));
        }
        if self.max_descriptors < MIN_FDS_PER_PROCESS {
            return Err(KernelError::Configuration(format!(
                "max_descriptors must be at least {} (standard streams), got {}",
                MIN_FDS_PER_PROCESS, self.max_descriptors
            )));
        }
        if i32::try_from(self.max_descriptors).is_err() {
            return Err(KernelError::Configuration(format!(
                "max_descriptors {} does not fit a descriptor number",
                self.max_descriptors
            )));
        }
        Ok(())
    }
}

impl Default for FileTableConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn read_env_usize(key: &str) -> Option<usize> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<usize>() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, value = %raw, error = %e, "Ignoring unparsable limit override");
            None
        }
    }
}
