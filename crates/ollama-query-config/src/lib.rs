//! Configuration for the ollama-query REPL.
//!
//! Provides TOML-based configuration with:
//! - Default server host and initial command line
//! - History file location and size
//! - Logging preferences (file logging, default verbosity)
//! - Config file layering (user config dir + project-local override)

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    config_dir, load_config, load_config_file, load_config_with_options, user_config_path,
    ConfigSource, LoadedConfig,
};
pub use error::{ConfigError, Result};
pub use types::*;
