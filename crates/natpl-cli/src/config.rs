//! User configuration
//!
//! Read from `natpl/config.toml` in the platform config directory, or from the
//! file given with `--config`. Every field is optional.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use natpl_core::runtime::DEFAULT_PRECISION;

/// History file name, relative to the home directory
const HISTORY_FILE: &str = ".natpl_history";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Significant digits kept by division
    pub precision: u64,
    /// Whether the REPL loads and saves line history
    pub history: bool,
    /// History location (defaults to `~/.natpl_history`)
    pub history_file: Option<PathBuf>,
    /// Programs evaluated before the REPL, `run` and `eval`
    pub prelude: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            history: true,
            history_file: None,
            prelude: Vec::new(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("natpl").join("config.toml"))
    }

    /// Load the configuration.
    ///
    /// An explicit path must exist and parse. The default file is optional,
    /// but a default file that exists and does not parse is still an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::config_path() {
                Some(path) if path.is_file() => path,
                _ => {
                    tracing::debug!("no config file, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Invalid config file '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Where REPL history is kept, if history is enabled
    pub fn history_path(&self) -> Option<PathBuf> {
        if !self.history {
            return None;
        }
        self.history_file
            .clone()
            .or_else(|| dirs::home_dir().map(|home| home.join(HISTORY_FILE)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn all_fields() {
        let config = Config::from_toml(
            r#"
precision = 20
history = false
history_file = "/tmp/natpl_history"
prelude = ["si.natpl", "constants.natpl"]
"#,
        )
        .unwrap();

        assert_eq!(config.precision, 20);
        assert!(!config.history);
        assert_eq!(config.history_file, Some(PathBuf::from("/tmp/natpl_history")));
        assert_eq!(config.prelude.len(), 2);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(Config::from_toml("precison = 20").is_err());
    }

    #[test]
    fn history_can_be_disabled() {
        let config = Config {
            history: false,
            history_file: Some(PathBuf::from("h")),
            ..Config::default()
        };
        assert_eq!(config.history_path(), None);

        let config = Config {
            history_file: Some(PathBuf::from("h")),
            ..Config::default()
        };
        assert_eq!(config.history_path(), Some(PathBuf::from("h")));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn explicit_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "precision = 7\n").unwrap();
        assert_eq!(Config::load(Some(&path)).unwrap().precision, 7);

        std::fs::write(&path, "precision = \"many\"\n").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }
}
