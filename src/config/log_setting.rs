//! Logging parameters derived from the resolved options.
use super::option::{OptionId, OptionSet};
use crate::error::OptionError;
use crate::logging::{LogLevel, LogSettings};

/// Derive the logging settings for the selected command.
///
/// The console level is `off` and timestamps are on unless the command
/// declares the corresponding options.  Only the console channel is driven
/// by options; stderr and file output stay off.
///
/// # Errors
///
/// Returns [`OptionError::InvalidValue`] if the log level is not a known level.
pub fn resolve(options: &OptionSet) -> Result<LogSettings, OptionError> {
    let mut settings = LogSettings::default();

    if options.valid(OptionId::LogLevel) {
        let level = options.str(OptionId::LogLevel)?;
        settings.console = level
            .parse::<LogLevel>()
            .map_err(|_| OptionError::InvalidValue {
                option: OptionId::LogLevel,
                value: level.to_owned(),
            })?;
    }

    if options.valid(OptionId::LogTimestamp) {
        settings.timestamp = options.bool(OptionId::LogTimestamp)?;
    }

    Ok(settings)
}
