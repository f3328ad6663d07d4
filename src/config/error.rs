//! Errors surfaced while loading a configuration file.

use std::fmt;

/// A failure reading or parsing a configuration file.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConfigError {
    /// The file could not be opened.
    Io(String),
    /// A value could not be parsed as the type its key requires.
    InvalidValue { section: String, key: String, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(path) => write!(f, "cannot open config file: {path}"),
            ConfigError::InvalidValue { section, key, value } => {
                write!(f, "invalid value for [{section}] {key} = {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
