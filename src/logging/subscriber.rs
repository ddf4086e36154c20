//! Tracing subscriber setup: line formatter and initialisation.
use std::io::IsTerminal as _;

use tracing_subscriber::filter::LevelFilter;

use super::types::{LogLevel, LogSettings};
use crate::error::LogError;

/// Process number printed on every line; the harness runs a single process.
const PROCESS_ID: u32 = 0;

/// Extracts the `message` field from a [`tracing::Event`].
#[derive(Default)]
struct MessageExtractor {
    message: String,
}

impl tracing::field::Visit for MessageExtractor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

/// Format the current local time as `YYYY-MM-DD HH:MM:SS.mmm`.
fn format_local_timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%d %H:%M:%S%.3f")
        .to_string()
}

/// Render one log line: `[timestamp ]Pnn LEVEL: message`.
fn format_line(level: tracing::Level, msg: &str, timestamp: Option<&str>, ansi: bool) -> String {
    let (label, colour) = match level {
        tracing::Level::ERROR => ("ERROR", Some("31")),
        tracing::Level::WARN => (" WARN", Some("33")),
        tracing::Level::INFO => (" INFO", None),
        tracing::Level::DEBUG => ("DEBUG", None),
        _ => ("TRACE", None),
    };
    let label = match colour.filter(|_| ansi) {
        Some(code) => format!("\x1b[{code}m{label}\x1b[0m"),
        None => label.to_owned(),
    };
    match timestamp {
        Some(ts) => format!("{ts} P{PROCESS_ID:02} {label}: {msg}"),
        None => format!("P{PROCESS_ID:02} {label}: {msg}"),
    }
}

/// A [`tracing_subscriber::fmt::FormatEvent`] that emits harness-style lines.
struct HarnessFormatter {
    timestamp: bool,
    ansi: bool,
}

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for HarnessFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let mut extractor = MessageExtractor::default();
        event.record(&mut extractor);
        let timestamp = self.timestamp.then(format_local_timestamp);
        writeln!(
            writer,
            "{}",
            format_line(
                *event.metadata().level(),
                &extractor.message,
                timestamp.as_deref(),
                self.ansi,
            )
        )
    }
}

/// Threshold for the stderr channel, which only ever carries warnings and errors.
fn stderr_filter(level: LogLevel) -> LevelFilter {
    level.filter().min(LevelFilter::WARN)
}

/// Initialise the global [`tracing`] subscriber from `settings`.
///
/// Installs a stdout layer filtered by the console level and a stderr layer
/// filtered by the stderr level.  No log file is opened; a file level other
/// than `off` is reported and otherwise ignored.
///
/// # Errors
///
/// Returns [`LogError::Init`] if a global subscriber is already installed.
pub fn init_subscriber(settings: &LogSettings) -> Result<(), LogError> {
    use tracing_subscriber::{
        Layer as _, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
    };

    let stdout_layer = fmt::layer()
        .event_format(HarnessFormatter {
            timestamp: settings.timestamp,
            ansi: std::io::stdout().is_terminal(),
        })
        .with_writer(std::io::stdout)
        .with_filter(settings.console.filter());

    let stderr_layer = fmt::layer()
        .event_format(HarnessFormatter {
            timestamp: settings.timestamp,
            ansi: std::io::stderr().is_terminal(),
        })
        .with_writer(std::io::stderr)
        .with_filter(stderr_filter(settings.stderr));

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(stderr_layer)
        .try_init()?;

    if settings.file != LogLevel::Off {
        tracing::warn!(
            "no log file is configured, ignoring file log level '{}'",
            settings.file
        );
    }
    Ok(())
}
