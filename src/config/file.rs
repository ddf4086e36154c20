//! TOML config file loading.
//!
//! A config file is a flat table keyed by option name:
//!
//! ```toml
//! log-level = "debug"
//! buffer-size = "4MiB"
//! repo-path = "/srv/harness"
//! ```
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use super::option::{OptionId, OptionKind, OptionValue};
use super::parse::StorageRoot;
use crate::cli::parse_size;
use crate::error::ParseError;
use crate::logging::LogLevel;

/// Raw contents of a config file.
pub type ConfigTable = BTreeMap<String, toml::Value>;

/// Location of the config file when `--config` is not given.
#[must_use]
pub fn default_path(root: &StorageRoot) -> PathBuf {
    root.path().join("etc").join("harness").join("harness.toml")
}

/// Read and deserialize a TOML config file.
///
/// Returns `Ok(None)` when the file does not exist and `required` is false.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config<T: DeserializeOwned>(path: &Path, required: bool) -> Result<Option<T>, ParseError> {
    let content = match crate::io::read_to_string(path) {
        Ok(content) => content,
        Err(err) if !required && err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ParseError::ConfigRead {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    toml::from_str(&content)
        .map(Some)
        .map_err(|source| ParseError::ConfigSyntax {
            path: path.to_path_buf(),
            source,
        })
}

/// Convert a config file value into the stored form for `id`.
///
/// # Errors
///
/// Returns a message describing the expected shape when `value` does not fit.
pub fn option_value(id: OptionId, value: &toml::Value) -> Result<OptionValue, String> {
    match (id.kind(), value) {
        (OptionKind::Bool, toml::Value::Boolean(flag)) => Ok(OptionValue::Bool(*flag)),
        (OptionKind::Bool, _) => Err("expected a boolean".to_owned()),
        (OptionKind::Size, toml::Value::Integer(bytes)) => parse_size(&bytes.to_string()).map(OptionValue::Size),
        (OptionKind::Size, toml::Value::String(size)) => parse_size(size).map(OptionValue::Size),
        (OptionKind::Size, _) => Err("expected a size".to_owned()),
        (OptionKind::Str, toml::Value::String(text)) if id == OptionId::LogLevel => text
            .parse::<LogLevel>()
            .map(|_| OptionValue::Str(text.clone()))
            .map_err(|err| err.to_string()),
        (OptionKind::Str, toml::Value::String(text)) => Ok(OptionValue::Str(text.clone())),
        (OptionKind::Str, _) => Err("expected a string".to_owned()),
    }
}
