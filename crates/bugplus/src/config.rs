//! Engine limits, loadable from `Bugplus.toml`.
//!
//! ```toml
//! call_limit = 20
//! max_chain_depth = 10000
//! max_nesting_depth = 64
//! ```

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "Bugplus.toml";

pub const DEFAULT_CALL_LIMIT: u32 = 20;
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 10_000;
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// A stateful primitive fails once its call counter reaches this value
    pub call_limit: u32,
    /// Longest control chain one `execute` may walk
    pub max_chain_depth: usize,
    /// Deepest program nesting `instantiate` accepts
    pub max_nesting_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            call_limit: DEFAULT_CALL_LIMIT,
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "cannot read {}: {source}", path.display())
            }
            ConfigError::Parse(err) => write!(f, "invalid engine config: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(err) => Some(err),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(ConfigError::Parse)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Load the nearest `Bugplus.toml` at or above `start`, or the defaults.
    pub fn discover(start: &Path) -> Result<(Self, Option<PathBuf>), ConfigError> {
        match find_config(start) {
            Some(path) => {
                log::debug!("loading engine config from {}", path.display());
                Ok((Self::from_file(&path)?, Some(path)))
            }
            None => Ok((Self::default(), None)),
        }
    }
}

/// Search upward from `start` for `Bugplus.toml`.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}
