//! Option resolution and the configuration bootstrap.
//!
//! - **[`option`]**: option, command and source identifiers plus the resolved [`OptionSet`]
//! - **[`parse`]**: the [`ArgParser`] seam and its clap-backed implementation
//! - **[`file`]**: TOML config file loading
//! - **[`path`]**: absolute path normalization
//! - **[`log_setting`]**: logging parameters from resolved options
//! - **[`load`]**: the [`Bootstrap`] sequence tying the above together

pub mod file;
pub mod load;
pub mod log_setting;
pub mod option;
pub mod parse;
pub mod path;

pub use load::{Bootstrap, FALLBACK_COMMAND, NO_CONFIG_ARG};
pub use option::{CommandId, OptionEntry, OptionId, OptionKind, OptionSet, OptionSource, OptionValue};
pub use parse::{ArgParser, ClapParser, StorageRoot};
