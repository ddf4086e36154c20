//! Command start/finish reporting and help rendering.
use std::time::Duration;

use clap::CommandFactory as _;

use crate::cli::Cli;
use crate::config::{OptionSet, OptionSource, OptionValue};

/// Version reported by `harness version` and in command-begin lines.
#[must_use]
pub fn version() -> &'static str {
    option_env!("HARNESS_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Render a size the way it would be written on the command line.
fn format_size(size: usize) -> String {
    const KIB: usize = 1024;
    const MIB: usize = 1024 * 1024;
    if size >= MIB && size % MIB == 0 {
        format!("{}MiB", size / MIB)
    } else if size >= KIB && size % KIB == 0 {
        format!("{}KiB", size / KIB)
    } else {
        size.to_string()
    }
}

/// Options that were set explicitly, formatted as command-line arguments.
///
/// Defaults and invalidated options are left out; negated options are shown
/// as `--no-<name>`.
#[must_use]
pub fn option_listing(options: &OptionSet) -> String {
    options
        .iter()
        .filter(|(_, entry)| entry.source != OptionSource::Default)
        .map(|(id, entry)| match &entry.value {
            Some(OptionValue::Bool(true)) => format!("--{id}"),
            Some(OptionValue::Bool(false)) | None => format!("--no-{id}"),
            Some(OptionValue::Size(size)) => format!("--{id}={}", format_size(*size)),
            Some(OptionValue::Str(value)) if value.contains(' ') => format!("--{id}=\"{value}\""),
            Some(OptionValue::Str(value)) => format!("--{id}={value}"),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Log the start of the selected command.
pub fn begin(options: &OptionSet) {
    let listing = option_listing(options);
    if listing.is_empty() {
        tracing::info!("{} command begin {}", options.command(), version());
    } else {
        tracing::info!(
            "{} command begin {}: {listing}",
            options.command(),
            version()
        );
    }
}

/// Log successful completion of the selected command.
pub fn end(options: &OptionSet, elapsed: Duration) {
    tracing::info!(
        "{} command end: completed successfully ({}ms)",
        options.command(),
        elapsed.as_millis()
    );
}

/// Help text for the harness, or for one of its commands.
///
/// Returns `None` if `command` does not name a visible command.
#[must_use]
pub fn render_help(command: Option<&str>) -> Option<String> {
    let mut cli = Cli::command();
    cli.build();
    match command {
        None => Some(cli.render_help().to_string()),
        Some(name) => cli
            .find_subcommand_mut(name)
            .filter(|sub| !sub.is_hide_set())
            .map(|sub| sub.render_help().to_string()),
    }
}
