//! Configuration types.
//!
//! ```toml
//! host = "http://ai.local:11434"
//! action = "ls; ps"
//!
//! [history]
//! path = "~/.ollama-query_history"
//! max_entries = 1000
//!
//! [logging]
//! file = true
//! verbosity = 0
//! ```
//!
//! Every field is optional so that a layer only overrides what it sets.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Default number of history entries kept by the line editor.
pub const DEFAULT_MAX_HISTORY: usize = 1000;

/// History file name inside the config directory.
const HISTORY_FILE: &str = "history";

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Server URL.
    pub host: Option<String>,

    /// Command line executed once before the first prompt.
    pub action: Option<String>,

    /// Line editor history.
    pub history: HistoryConfig,

    /// Logging preferences.
    pub logging: LoggingConfig,
}

impl QueryConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Merge another config on top of this one (other takes priority).
    pub fn merge(&mut self, other: QueryConfig) {
        if other.host.is_some() {
            self.host = other.host;
        }
        if other.action.is_some() {
            self.action = other.action;
        }
        self.history.merge(other.history);
        self.logging.merge(other.logging);
    }

    /// Initial command line, ignoring blank values.
    pub fn initial_action(&self) -> Option<&str> {
        self.action
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
    }
}

/// History file configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// History file. Default: `<config dir>/history`.
    pub path: Option<PathBuf>,

    /// Maximum number of entries kept. Default: 1000.
    pub max_entries: Option<usize>,
}

impl HistoryConfig {
    fn merge(&mut self, other: HistoryConfig) {
        if other.path.is_some() {
            self.path = other.path;
        }
        if other.max_entries.is_some() {
            self.max_entries = other.max_entries;
        }
    }

    /// Resolve the history file, expanding a leading `~/`.
    ///
    /// Falls back to `history` inside `config_dir`; `None` when neither is
    /// available.
    pub fn effective_path(&self, config_dir: Option<&Path>) -> Option<PathBuf> {
        match &self.path {
            Some(path) => Some(expand_home(path)),
            None => config_dir.map(|dir| dir.join(HISTORY_FILE)),
        }
    }

    /// Maximum number of entries, with the default applied.
    pub fn max_entries(&self) -> usize {
        self.max_entries.unwrap_or(DEFAULT_MAX_HISTORY)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Write a JSON log file under `<config dir>/logs`. Default: true.
    pub file: Option<bool>,

    /// Baseline verbosity, raised by `-v` flags. Default: 0.
    pub verbosity: Option<u8>,
}

impl LoggingConfig {
    fn merge(&mut self, other: LoggingConfig) {
        if other.file.is_some() {
            self.file = other.file;
        }
        if other.verbosity.is_some() {
            self.verbosity = other.verbosity;
        }
    }

    /// Whether file logging is on.
    pub fn file_enabled(&self) -> bool {
        self.file.unwrap_or(true)
    }

    /// Baseline verbosity.
    pub fn verbosity(&self) -> u8 {
        self.verbosity.unwrap_or(0)
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = QueryConfig::from_toml(
            r#"
host = "http://ai.local:11434"
action = "ls"

[history]
path = "/tmp/oq-history"
max_entries = 50

[logging]
file = false
verbosity = 2
"#,
        )
        .unwrap();

        assert_eq!(config.host.as_deref(), Some("http://ai.local:11434"));
        assert_eq!(config.initial_action(), Some("ls"));
        assert_eq!(config.history.max_entries(), 50);
        assert!(!config.logging.file_enabled());
        assert_eq!(config.logging.verbosity(), 2);
    }

    #[test]
    fn test_defaults() {
        let config = QueryConfig::new();
        assert!(config.host.is_none());
        assert!(config.initial_action().is_none());
        assert_eq!(config.history.max_entries(), DEFAULT_MAX_HISTORY);
        assert!(config.logging.file_enabled());
        assert_eq!(config.logging.verbosity(), 0);
    }

    #[test]
    fn test_blank_action_is_ignored() {
        let config = QueryConfig::from_toml("action = \"   \"").unwrap();
        assert!(config.initial_action().is_none());
    }

    #[test]
    fn test_merge_overrides_only_set_fields() {
        let mut base = QueryConfig::from_toml(
            r#"
host = "http://base:11434"
action = "help"

[history]
max_entries = 10
"#,
        )
        .unwrap();
        let layer = QueryConfig::from_toml(
            r#"
host = "http://override:11434"

[logging]
verbosity = 1
"#,
        )
        .unwrap();

        base.merge(layer);
        assert_eq!(base.host.as_deref(), Some("http://override:11434"));
        assert_eq!(base.action.as_deref(), Some("help"));
        assert_eq!(base.history.max_entries(), 10);
        assert_eq!(base.logging.verbosity(), 1);
    }

    #[test]
    fn test_history_path_resolution() {
        let history = HistoryConfig::default();
        assert_eq!(
            history.effective_path(Some(Path::new("/cfg"))),
            Some(PathBuf::from("/cfg/history"))
        );
        assert!(history.effective_path(None).is_none());

        let history = HistoryConfig {
            path: Some(PathBuf::from("/var/tmp/h")),
            max_entries: None,
        };
        assert_eq!(
            history.effective_path(Some(Path::new("/cfg"))),
            Some(PathBuf::from("/var/tmp/h"))
        );
    }

    #[test]
    fn test_history_path_expands_home() {
        let history = HistoryConfig {
            path: Some(PathBuf::from("~/.oq_history")),
            max_entries: None,
        };
        let path = history.effective_path(None).unwrap();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(path, home.join(".oq_history"));
        }
    }
}
