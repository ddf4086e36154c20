//! Resolved option values, their provenance, and per-command validity.
use std::collections::BTreeMap;
use std::fmt;

use crate::error::OptionError;

/// Commands known to the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandId {
    /// No command has been selected.
    None,
    /// Placeholder that anchors option declarations; never runnable.
    Noop,
    /// Print usage information.
    Help,
    /// Print the version.
    Version,
    /// Run the test harness.
    Test,
}

impl CommandId {
    /// Name used on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Noop => "noop",
            Self::Help => "help",
            Self::Version => "version",
            Self::Test => "test",
        }
    }

    /// Commands that only report information and never touch process state.
    #[must_use]
    pub const fn is_informational(self) -> bool {
        matches!(self, Self::None | Self::Help | Self::Version)
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value type of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// Flag, negatable with `--no-<name>`.
    Bool,
    /// Byte size such as `1MiB`.
    Size,
    /// Free-form string or path.
    Str,
}

/// Options the bootstrap knows about, in listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionId {
    /// IO buffer size.
    BufferSize,
    /// Config file path.
    Config,
    /// Console log level.
    LogLevel,
    /// Timestamp console log lines.
    LogTimestamp,
    /// Reset the umask before running.
    NeutralUmask,
    /// Repository root.
    RepoPath,
    /// Scratch directory for test runs.
    TestPath,
    /// Container image; declared on the placeholder command only.
    Vm,
}

impl OptionId {
    /// Every option, in listing order.
    pub const ALL: [Self; 8] = [
        Self::BufferSize,
        Self::Config,
        Self::LogLevel,
        Self::LogTimestamp,
        Self::NeutralUmask,
        Self::RepoPath,
        Self::TestPath,
        Self::Vm,
    ];

    /// Name used on the command line and as a config file key.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BufferSize => "buffer-size",
            Self::Config => "config",
            Self::LogLevel => "log-level",
            Self::LogTimestamp => "log-timestamp",
            Self::NeutralUmask => "neutral-umask",
            Self::RepoPath => "repo-path",
            Self::TestPath => "test-path",
            Self::Vm => "vm",
        }
    }

    /// Look up an option by its name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.name() == name)
    }

    /// Value type of the option.
    #[must_use]
    pub const fn kind(self) -> OptionKind {
        match self {
            Self::LogTimestamp | Self::NeutralUmask => OptionKind::Bool,
            Self::BufferSize => OptionKind::Size,
            Self::Config | Self::LogLevel | Self::RepoPath | Self::TestPath | Self::Vm => {
                OptionKind::Str
            }
        }
    }

    /// Whether the option is declared for `command`.
    #[must_use]
    pub const fn is_valid_for(self, command: CommandId) -> bool {
        match self {
            Self::Config | Self::LogLevel | Self::LogTimestamp => {
                matches!(command, CommandId::Test | CommandId::Noop)
            }
            Self::BufferSize | Self::NeutralUmask | Self::RepoPath | Self::TestPath => {
                matches!(command, CommandId::Test)
            }
            Self::Vm => matches!(command, CommandId::Noop),
        }
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionSource {
    /// Declared default.
    Default,
    /// Config file.
    Config,
    /// Environment variable.
    Environment,
    /// Command-line parameter.
    Param,
}

/// A resolved option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// Flag value.
    Bool(bool),
    /// Size in bytes.
    Size(usize),
    /// String or path.
    Str(String),
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<usize> for OptionValue {
    fn from(value: usize) -> Self {
        Self::Size(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// Stored state of one option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionEntry {
    /// Resolved value; `None` when the option was negated (`--no-<name>`).
    pub value: Option<OptionValue>,
    /// Provenance of the value.
    pub source: OptionSource,
    valid: bool,
}

impl OptionEntry {
    /// Whether the option applies to the current command.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Resolved options for the selected command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSet {
    command: CommandId,
    help: bool,
    params: Vec<String>,
    entries: BTreeMap<OptionId, OptionEntry>,
}

impl OptionSet {
    /// Create an empty set for `command`.
    #[must_use]
    pub const fn new(command: CommandId) -> Self {
        Self {
            command,
            help: false,
            params: Vec::new(),
            entries: BTreeMap::new(),
        }
    }

    /// Mark the set as the help variant of its command (`<command> --help`).
    #[must_use]
    pub const fn with_help(mut self, help: bool) -> Self {
        self.help = help;
        self
    }

    /// Attach positional command parameters.
    #[must_use]
    pub fn with_params(mut self, params: Vec<String>) -> Self {
        self.params = params;
        self
    }

    /// Builder form of [`OptionSet::set`] for a present value.
    #[must_use]
    pub fn with(mut self, id: OptionId, source: OptionSource, value: impl Into<OptionValue>) -> Self {
        self.set(id, source, Some(value.into()));
        self
    }

    /// Builder form of [`OptionSet::set`] for a negated option.
    #[must_use]
    pub fn with_negated(mut self, id: OptionId, source: OptionSource) -> Self {
        self.set(id, source, None);
        self
    }

    /// Store `value` for `id` with the given provenance.
    ///
    /// Validity follows the declaration table, so a value stored for an
    /// option the command does not declare stays hidden.
    pub fn set(&mut self, id: OptionId, source: OptionSource, value: Option<OptionValue>) {
        let valid = id.is_valid_for(self.command);
        self.entries.insert(
            id,
            OptionEntry {
                value,
                source,
                valid,
            },
        );
    }

    /// Hide `id` from validity checks and from [`OptionSet::iter`].
    pub fn invalidate(&mut self, id: OptionId) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.valid = false;
        }
    }

    /// Selected command.
    #[must_use]
    pub const fn command(&self) -> CommandId {
        self.command
    }

    /// Whether help was requested for the selected command.
    #[must_use]
    pub const fn command_help(&self) -> bool {
        self.help
    }

    /// Positional command parameters.
    #[must_use]
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Whether `id` is set and applies to the selected command.
    #[must_use]
    pub fn valid(&self, id: OptionId) -> bool {
        self.entries.get(&id).is_some_and(OptionEntry::is_valid)
    }

    /// Provenance of `id`, if stored.
    #[must_use]
    pub fn source(&self, id: OptionId) -> Option<OptionSource> {
        self.entries.get(&id).map(|entry| entry.source)
    }

    /// Raw value of `id`, if stored and not negated.
    #[must_use]
    pub fn value(&self, id: OptionId) -> Option<&OptionValue> {
        self.entries.get(&id).and_then(|entry| entry.value.as_ref())
    }

    fn valid_value(&self, id: OptionId) -> Result<&OptionValue, OptionError> {
        let entry = self
            .entries
            .get(&id)
            .filter(|entry| entry.valid)
            .ok_or(OptionError::NotValid(id))?;
        entry.value.as_ref().ok_or(OptionError::NoValue(id))
    }

    /// String value of a valid option.
    ///
    /// # Errors
    ///
    /// Returns an error if the option is not valid, negated, or not a string.
    pub fn str(&self, id: OptionId) -> Result<&str, OptionError> {
        match self.valid_value(id)? {
            OptionValue::Str(value) => Ok(value),
            _ => Err(OptionError::WrongType {
                option: id,
                expected: "string",
            }),
        }
    }

    /// Boolean value of a valid option.
    ///
    /// # Errors
    ///
    /// Returns an error if the option is not valid or not a boolean.
    pub fn bool(&self, id: OptionId) -> Result<bool, OptionError> {
        match self.valid_value(id) {
            Ok(OptionValue::Bool(value)) => Ok(*value),
            // A negated flag is simply false.
            Err(OptionError::NoValue(_)) if id.kind() == OptionKind::Bool => Ok(false),
            Ok(_) => Err(OptionError::WrongType {
                option: id,
                expected: "boolean",
            }),
            Err(err) => Err(err),
        }
    }

    /// Size value of a valid option.
    ///
    /// # Errors
    ///
    /// Returns an error if the option is not valid, negated, or not a size.
    pub fn size(&self, id: OptionId) -> Result<usize, OptionError> {
        match self.valid_value(id)? {
            OptionValue::Size(value) => Ok(*value),
            _ => Err(OptionError::WrongType {
                option: id,
                expected: "size",
            }),
        }
    }

    /// Valid options in listing order.
    pub fn iter(&self) -> impl Iterator<Item = (OptionId, &OptionEntry)> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.valid)
            .map(|(id, entry)| (*id, entry))
    }
}
