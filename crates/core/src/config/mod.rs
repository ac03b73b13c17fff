//! Process-wide pass configuration.
//!
//! Built once at startup (from defaults, plugin arguments or CLI flags) and
//! shared read-only afterwards.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Output list used when no `file` argument is given.
pub const DEFAULT_OUTPUT_FILE: &str = "./dump_memory_accesses.list";

/// Plugin argument selecting the output list.
pub const FILE_ARGUMENT: &str = "file";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Plugin argument \"file\" requires a non-empty path")]
    EmptyOutputPath,

    #[error("Plugin argument has an empty key: \"{0}\"")]
    EmptyKey(String),
}

/// A `key=value` argument handed to the pass by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginArgument {
    pub key: String,
    pub value: String,
}

impl PluginArgument {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

impl FromStr for PluginArgument {
    type Err = ConfigError;

    /// Parse `key=value`; a missing `=` yields an empty value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = s.split_once('=').unwrap_or((s, ""));
        let key = key.trim();
        if key.is_empty() {
            return Err(ConfigError::EmptyKey(s.to_string()));
        }
        Ok(Self::new(key, value))
    }
}

/// Configuration of the memory access pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassConfig {
    /// File the access list is appended to.
    pub output_path: PathBuf,
    /// Interprocedural points-to analysis ran for this compilation.
    #[serde(default)]
    pub ipa_pta: bool,
    /// Bounded wait for the output file lock; `None` blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_timeout_ms: Option<u64>,
}

impl Default for PassConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            ipa_pta: false,
            lock_timeout_ms: None,
        }
    }
}

impl PassConfig {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self { output_path: output_path.into(), ..Self::default() }
    }

    /// Apply host-provided plugin arguments on top of the defaults.
    ///
    /// Only `file=<path>` is understood; other keys are reported and ignored.
    pub fn from_plugin_args(args: &[PluginArgument]) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for arg in args {
            if arg.key == FILE_ARGUMENT {
                if arg.value.is_empty() {
                    return Err(ConfigError::EmptyOutputPath);
                }
                config.output_path = PathBuf::from(&arg.value);
            } else {
                warn!("[ma_lines] Unknown plugin argument \"{}\", ignoring it.", arg.key);
            }
        }
        Ok(config)
    }

    pub fn with_ipa_pta(mut self, ipa_pta: bool) -> Self {
        self.ipa_pta = ipa_pta;
        self
    }

    pub fn with_lock_timeout_ms(mut self, timeout_ms: Option<u64>) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    pub fn lock_timeout(&self) -> Option<Duration> {
        self.lock_timeout_ms.map(Duration::from_millis)
    }
}
