//! Argument parsing: the [`ArgParser`] seam and its clap-backed implementation.
use std::fmt;
use std::path::{Path, PathBuf};

use clap::error::ErrorKind;
use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory as _, FromArgMatches as _};

use super::file::{self, ConfigTable};
use super::option::{CommandId, OptionId, OptionSet, OptionSource, OptionValue};
use crate::cli::{Cli, Command};
use crate::error::ParseError;
use crate::platform::PlatformKind;

/// Filesystem root the parser resolves default file locations against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageRoot(PathBuf);

impl StorageRoot {
    /// Use `path` as the root.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Root of the given platform convention (`/` or `C:\`).
    #[must_use]
    pub fn for_platform(platform: PlatformKind) -> Self {
        Self::new(platform.root())
    }

    /// Root directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for StorageRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Turns an argument list into resolved options.
///
/// The bootstrap only depends on this trait, so tests can script parse
/// outcomes without building real argument lists.
pub trait ArgParser: fmt::Debug {
    /// Parse `args` (program name first).
    ///
    /// With `strict`, config file keys that the selected command does not
    /// declare are errors instead of warnings.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::CommandRequired`] when no command was given, and
    /// other [`ParseError`] variants for any other rejection.
    fn parse(&self, root: &StorageRoot, args: &[String], strict: bool) -> Result<OptionSet, ParseError>;
}

/// [`ArgParser`] backed by the [`Cli`] definition and an optional TOML config file.
///
/// Precedence is command line, then environment, then config file, then
/// declared defaults.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClapParser;

impl ArgParser for ClapParser {
    fn parse(&self, root: &StorageRoot, args: &[String], strict: bool) -> Result<OptionSet, ParseError> {
        let matches = Cli::command()
            .try_get_matches_from(args)
            .map_err(classify)?;
        let cli = Cli::from_arg_matches(&matches)?;
        let leaf = matches.subcommand().map_or(&matches, |(_, sub)| sub);

        let (command, params) = match &cli.command {
            Command::Test(_) => (CommandId::Test, Vec::new()),
            Command::Noop(_) => (CommandId::Noop, Vec::new()),
            Command::Help { command } => (CommandId::Help, command.iter().cloned().collect()),
            Command::Version => (CommandId::Version, Vec::new()),
        };
        let mut options = OptionSet::new(command)
            .with_help(cli.global.help)
            .with_params(params);

        let mut declare = |id: OptionId, arg: &str, value: Option<OptionValue>| {
            if id.is_valid_for(command) {
                options.set(id, value_source(leaf, arg), value);
            }
        };

        declare(
            OptionId::LogLevel,
            "log_level",
            Some(cli.global.log_level.into()),
        );
        declare(
            OptionId::LogTimestamp,
            "log_timestamp",
            Some(cli.global.log_timestamp.into()),
        );
        // `--no-config` only turns off discovery of the default file.
        if let Some(path) = &cli.global.config {
            declare(
                OptionId::Config,
                "config",
                Some(path.to_string_lossy().into_owned().into()),
            );
        } else if cli.global.no_config {
            declare(OptionId::Config, "no_config", None);
        } else {
            declare(
                OptionId::Config,
                "config",
                Some(file::default_path(root).to_string_lossy().into_owned().into()),
            );
        }

        match cli.command {
            Command::Test(opts) => {
                declare(
                    OptionId::NeutralUmask,
                    "neutral_umask",
                    Some(opts.neutral_umask.into()),
                );
                declare(
                    OptionId::BufferSize,
                    "buffer_size",
                    Some(opts.buffer_size.into()),
                );
                declare(OptionId::RepoPath, "repo_path", Some(opts.repo_path.into()));
                declare(OptionId::TestPath, "test_path", Some(opts.test_path.into()));
            }
            Command::Noop(opts) => {
                if let Some(vm) = opts.vm {
                    declare(OptionId::Vm, "vm", Some(vm.into()));
                }
            }
            Command::Help { .. } | Command::Version => {}
        }

        apply_config_file(&mut options, strict)?;
        Ok(options)
    }
}

/// Separate the retriable missing-command condition from other clap errors.
fn classify(err: clap::Error) -> ParseError {
    match err.kind() {
        ErrorKind::MissingSubcommand | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            ParseError::CommandRequired
        }
        _ => ParseError::Usage(err),
    }
}

fn value_source(matches: &ArgMatches, arg: &str) -> OptionSource {
    match matches.value_source(arg) {
        Some(ValueSource::CommandLine) => OptionSource::Param,
        Some(ValueSource::EnvVariable) => OptionSource::Environment,
        _ => OptionSource::Default,
    }
}

/// Fill options still at their defaults from the config file, if one applies.
fn apply_config_file(options: &mut OptionSet, strict: bool) -> Result<(), ParseError> {
    if !options.valid(OptionId::Config) {
        return Ok(());
    }
    let Some(OptionValue::Str(path)) = options.value(OptionId::Config) else {
        tracing::debug!("config file disabled");
        return Ok(());
    };
    let path = PathBuf::from(path);
    let required = options.source(OptionId::Config) != Some(OptionSource::Default);

    let Some(table) = file::load_config::<ConfigTable>(&path, required)? else {
        tracing::debug!("no config file at '{}'", path.display());
        return Ok(());
    };
    tracing::debug!("loaded config file '{}'", path.display());

    for (key, value) in &table {
        let id = OptionId::from_name(key)
            .filter(|id| *id != OptionId::Config && id.is_valid_for(options.command()));
        let Some(id) = id else {
            if strict {
                return Err(ParseError::ConfigUnknownKey {
                    path,
                    key: key.clone(),
                });
            }
            tracing::warn!(
                "ignoring option '{key}' in config file '{}'",
                path.display()
            );
            continue;
        };

        if options.source(id) != Some(OptionSource::Default) {
            continue;
        }
        let value = file::option_value(id, value).map_err(|message| ParseError::ConfigValue {
            path: path.clone(),
            option: key.clone(),
            message,
        })?;
        options.set(id, OptionSource::Config, Some(value));
    }
    Ok(())
}
