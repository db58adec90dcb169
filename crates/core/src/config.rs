//! JSON configuration for the core.
//!
//! Every field is optional; a missing section or key keeps its default.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::logging::{log, LogCategory, LogConfig, LogLevel};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Execution policy of a CPU core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuConfig {
    /// Propagate unmapped-location bus faults instead of treating the access
    /// as a no-op that reads 0
    pub strict_addressing: bool,
    /// Skip PC mutation on jumps, branches, calls and returns while still
    /// performing their bus accesses and cycles
    pub no_flow_control: bool,
    /// Address of the little-endian reset vector
    pub reset_vector: u16,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            strict_addressing: false,
            no_flow_control: false,
            reset_vector: 0xFFFC,
        }
    }
}

/// Log levels by category, as level names ("off", "warn", "trace", ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub global: String,
    pub cpu: Option<String>,
    pub bus: Option<String>,
    pub quirks: Option<String>,
    pub clock: Option<String>,
    pub rate_limit: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            global: "off".to_string(),
            cpu: None,
            bus: None,
            quirks: None,
            clock: None,
            rate_limit: 60,
        }
    }
}

impl LoggingConfig {
    /// Push these settings into the global [`LogConfig`].
    ///
    /// Unknown level names are reported and leave that level untouched.
    pub fn apply(&self) {
        let config = LogConfig::global();
        match LogLevel::from_str(&self.global) {
            Some(level) => config.set_global_level(level),
            None => warn_unknown_level("global", &self.global),
        }

        let categories = [
            (LogCategory::Cpu, "cpu", &self.cpu),
            (LogCategory::Bus, "bus", &self.bus),
            (LogCategory::Quirks, "quirks", &self.quirks),
            (LogCategory::Clock, "clock", &self.clock),
        ];
        for (category, key, value) in categories {
            let Some(name) = value else { continue };
            match LogLevel::from_str(name) {
                Some(level) => config.set_level(category, level),
                None => warn_unknown_level(key, name),
            }
        }

        config.set_rate_limit(self.rate_limit);
    }
}

fn warn_unknown_level(key: &str, name: &str) {
    // Goes straight to the facade: the category levels may not be set yet.
    ::log::warn!(target: "vcs::config", "unknown log level {:?} for {:?}", name, key);
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub cpu: CpuConfig,
    pub logging: LoggingConfig,
}

impl CoreConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Load from `path`, falling back to defaults when the file is missing
    /// or malformed.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                log(LogCategory::Cpu, LogLevel::Warn, || {
                    format!("{}: {}. Using defaults.", path.display(), e)
                });
                Self::default()
            }
        }
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
