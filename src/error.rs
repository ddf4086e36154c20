//! Domain-specific error types for the harness bootstrap.
//!
//! Library modules return these typed errors; `main` converts them to
//! [`anyhow::Error`] via `?`.
//!
//! # Error hierarchy
//!
//! ```text
//! BootstrapError
//! ├── Parse(ParseError)    : argument and config file parsing
//! ├── CommandInvalid       : placeholder command selected
//! ├── CurrentDir           : working directory unavailable
//! ├── Option(OptionError)  : option store access
//! └── Log(LogError)        : logging initialisation
//! ```

use std::path::PathBuf;

use thiserror::Error;

use crate::config::OptionId;

/// Fatal error raised while bootstrapping the configuration.
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// Arguments could not be parsed (after the fallback retry, if any).
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The selected command exists only to anchor option declarations.
    #[error("invalid command '{0}'")]
    CommandInvalid(String),

    /// The current working directory could not be determined.
    #[error("unable to get cwd")]
    CurrentDir(#[source] std::io::Error),

    /// An option was read in a way its declaration does not allow.
    #[error(transparent)]
    Option(#[from] OptionError),

    /// The logging subsystem refused the settings.
    #[error(transparent)]
    Log(#[from] LogError),
}

/// Errors produced by an [`ArgParser`](crate::config::ArgParser).
#[derive(Error, Debug)]
pub enum ParseError {
    /// No command was given but one is required.
    #[error("command required")]
    CommandRequired,

    /// The argument list was rejected (unknown option, bad value, ...).
    #[error(transparent)]
    Usage(#[from] clap::Error),

    /// The config file could not be read.
    #[error("unable to read config file '{}': {source}", .path.display())]
    ConfigRead {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML.
    #[error("unable to parse config file '{}': {source}", .path.display())]
    ConfigSyntax {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// A config file entry has a value of the wrong shape.
    #[error("invalid value for option '{option}' in config file '{}': {message}", .path.display())]
    ConfigValue {
        /// Path of the config file.
        path: PathBuf,
        /// Option name as written in the file.
        option: String,
        /// Why the value was rejected.
        message: String,
    },

    /// A strict parse found a key that is not an option of the command.
    #[error("unknown option '{key}' in config file '{}'", .path.display())]
    ConfigUnknownKey {
        /// Path of the config file.
        path: PathBuf,
        /// Offending key.
        key: String,
    },
}

impl ParseError {
    /// Returns `true` for the one error kind that the bootstrap retries.
    #[must_use]
    pub const fn is_command_required(&self) -> bool {
        matches!(self, Self::CommandRequired)
    }
}

/// Errors raised by [`OptionSet`](crate::config::OptionSet) accessors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionError {
    /// The option is not declared for the current command.
    #[error("option '{0}' is not valid for the current command")]
    NotValid(OptionId),

    /// The option is valid but carries no value (e.g. negated).
    #[error("option '{0}' has no value")]
    NoValue(OptionId),

    /// The stored value has a different type than requested.
    #[error("option '{option}' is not a {expected} option")]
    WrongType {
        /// Option that was read.
        option: OptionId,
        /// Requested type.
        expected: &'static str,
    },

    /// The stored value cannot be interpreted.
    #[error("invalid value '{value}' for option '{option}'")]
    InvalidValue {
        /// Option that was read.
        option: OptionId,
        /// Offending value.
        value: String,
    },
}

/// Errors raised while initialising logging.
#[derive(Error, Debug)]
pub enum LogError {
    /// A global subscriber was already installed.
    #[error("unable to initialise logging: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}
