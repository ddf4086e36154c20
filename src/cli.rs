//! Command-line surface: commands, options and value parsers.
use std::path::PathBuf;

use clap::builder::PossibleValuesParser;
use clap::{ArgAction, Args, Parser, Subcommand};

use crate::logging::LogLevel;

/// Smallest accepted IO buffer size.
pub const MIN_BUFFER_SIZE: usize = 16 * 1024;

/// Largest accepted IO buffer size.
pub const MAX_BUFFER_SIZE: usize = 16 * 1024 * 1024;

/// Top-level CLI definition for the test harness.
///
/// Built-in help and version handling is disabled: `help` and `version` are
/// ordinary commands, and `--help` marks the help variant of a command, so
/// the bootstrap decides what runs.
#[derive(Parser, Debug)]
#[command(
    name = "harness",
    about = "Test harness with deterministic configuration bootstrap",
    disable_help_flag = true,
    disable_help_subcommand = true,
    disable_version_flag = true,
    subcommand_required = true
)]
pub struct Cli {
    /// Selected command.
    #[command(subcommand)]
    pub command: Command,

    /// Options shared by every command.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all commands.
#[derive(Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Console log level
    #[arg(
        long,
        global = true,
        default_value = "info",
        env = "HARNESS_LOG_LEVEL",
        ignore_case = true,
        value_parser = PossibleValuesParser::new(LogLevel::NAMES)
    )]
    pub log_level: String,

    /// Do not timestamp log lines
    #[arg(long = "no-log-timestamp", global = true, action = ArgAction::SetFalse)]
    pub log_timestamp: bool,

    /// Config file to load options from
    #[arg(long, global = true, env = "HARNESS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Do not look for the default config file (`--config` still applies)
    #[arg(long, global = true, overrides_with = "no_config")]
    pub no_config: bool,

    /// Show help for the command
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    pub help: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the test harness
    Test(TestOpts),
    /// Declare options that the harness accepts but does not use
    #[command(hide = true)]
    Noop(NoopOpts),
    /// Show help for the harness or one of its commands
    Help {
        /// Command to describe
        command: Option<String>,
    },
    /// Print version information
    Version,
}

/// Options for the `test` command.
#[derive(Args, Debug, Clone)]
pub struct TestOpts {
    /// Keep the invoking shell's umask instead of resetting it
    #[arg(long = "no-neutral-umask", action = ArgAction::SetFalse)]
    pub neutral_umask: bool,

    /// IO buffer size (power of two from 16KiB to 16MiB)
    #[arg(
        long,
        default_value = "1MiB",
        env = "HARNESS_BUFFER_SIZE",
        value_parser = parse_size
    )]
    pub buffer_size: usize,

    /// Repository root
    #[arg(long, default_value = ".", env = "HARNESS_REPO_PATH")]
    pub repo_path: String,

    /// Scratch directory for test runs
    #[arg(long, default_value = "test", env = "HARNESS_TEST_PATH")]
    pub test_path: String,
}

/// Options for the placeholder `noop` command.
#[derive(Args, Debug, Clone)]
pub struct NoopOpts {
    /// Container image
    #[arg(long)]
    pub vm: Option<String>,
}

/// Parse a buffer size given in bytes or with a `KiB`/`MiB` suffix.
///
/// # Errors
///
/// Returns a message if the value is not a number, or is not a power of two
/// between [`MIN_BUFFER_SIZE`] and [`MAX_BUFFER_SIZE`].
pub fn parse_size(value: &str) -> Result<usize, String> {
    let lower = value.trim().to_ascii_lowercase();
    let (digits, multiplier) = if let Some(digits) = lower.strip_suffix("mib") {
        (digits, 1024 * 1024)
    } else if let Some(digits) = lower.strip_suffix("kib") {
        (digits, 1024)
    } else {
        (lower.as_str(), 1)
    };

    let size = digits
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_mul(multiplier))
        .ok_or_else(|| format!("'{value}' is not a size"))?;

    if !size.is_power_of_two() || !(MIN_BUFFER_SIZE..=MAX_BUFFER_SIZE).contains(&size) {
        return Err(format!(
            "'{value}' must be a power of two between 16KiB and 16MiB"
        ));
    }
    Ok(size)
}
