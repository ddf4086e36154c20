//! `harness` binary entry point.
use std::io::Write as _;
use std::time::Instant;

use anyhow::{Result, bail};

use harness_cli::command;
use harness_cli::config::{Bootstrap, ClapParser, CommandId};
use harness_cli::host::SystemHost;
use harness_cli::platform::PlatformKind;

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let started = Instant::now();
    let args: Vec<String> = std::env::args().collect();

    let options = Bootstrap::new(&ClapParser, &SystemHost, PlatformKind::detect()).run(&args)?;
    let mut stdout = std::io::stdout().lock();

    match options.command() {
        CommandId::Help => {
            let target = options.params().first().map(String::as_str);
            let Some(help) = command::render_help(target) else {
                bail!("invalid command '{}'", target.unwrap_or_default());
            };
            write!(stdout, "{help}")?;
        }
        CommandId::Version => writeln!(stdout, "harness {}", command::version())?,
        CommandId::Test if options.command_help() => {
            if let Some(help) = command::render_help(Some(CommandId::Test.name())) {
                write!(stdout, "{help}")?;
            }
        }
        CommandId::Test => command::end(&options, started.elapsed()),
        CommandId::None | CommandId::Noop => {}
    }
    Ok(())
}
