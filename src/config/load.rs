//! The bootstrap sequence run before any command body.
use super::log_setting;
use super::option::{CommandId, OptionId, OptionSet};
use super::parse::{ArgParser, StorageRoot};
use super::path;
use crate::error::{BootstrapError, ParseError};
use crate::host::Host;
use crate::platform::PlatformKind;

/// Appended to every argument list so a stray default config file cannot
/// change behaviour.  A config file named explicitly is still loaded.
pub const NO_CONFIG_ARG: &str = "--no-config";

/// Appended on retry when the arguments name no command.
pub const FALLBACK_COMMAND: &str = CommandId::Test.name();

/// Parse attempts; only `Initial` may move on to `Fallback`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Initial,
    Fallback,
}

/// Turns raw process arguments into validated, normalized options and primes
/// the process for the selected command.
///
/// Runs once per process, before any command logic.
#[derive(Debug)]
pub struct Bootstrap<'a> {
    parser: &'a dyn ArgParser,
    host: &'a dyn Host,
    platform: PlatformKind,
}

impl<'a> Bootstrap<'a> {
    /// Create a bootstrap over the given collaborators.
    #[must_use]
    pub const fn new(parser: &'a dyn ArgParser, host: &'a dyn Host, platform: PlatformKind) -> Self {
        Self {
            parser,
            host,
            platform,
        }
    }

    /// Run the bootstrap for `raw_args` (program name first).
    ///
    /// Informational commands (none, help, version) return right after
    /// parsing.  Any other command gets, in order: logging (unless help was
    /// requested), the umask reset, the IO buffer size, absolute path
    /// options and finally the command-begin signal.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails (after at most one fallback retry),
    /// if the placeholder command is selected, if the working directory is
    /// unavailable, or if logging cannot be initialised.
    pub fn run(&self, raw_args: &[String]) -> Result<OptionSet, BootstrapError> {
        let mut args = raw_args.to_vec();
        args.push(NO_CONFIG_ARG.to_owned());
        let root = StorageRoot::for_platform(self.platform);

        let mut options = self.parse(&root, args)?;
        let command = options.command();

        if command == CommandId::Noop {
            return Err(BootstrapError::CommandInvalid(command.name().to_owned()));
        }
        if command.is_informational() {
            tracing::debug!("{command} is informational, skipping process setup");
            return Ok(options);
        }

        // Captured before any process state changes so a failure leaves none behind.
        let cwd = self
            .host
            .current_dir()
            .map_err(BootstrapError::CurrentDir)?;

        if !options.command_help() {
            let settings = log_setting::resolve(&options)?;
            self.host.init_logging(&settings)?;
        }

        if options.valid(OptionId::NeutralUmask) && options.bool(OptionId::NeutralUmask)? {
            self.host.neutralize_umask();
        }

        if options.valid(OptionId::BufferSize) {
            self.host
                .set_io_buffer_size(options.size(OptionId::BufferSize)?);
        }

        options.invalidate(OptionId::Config);
        path::normalize(&mut options, &cwd, self.platform);

        self.host.command_begin(&options);
        Ok(options)
    }

    /// Parse `args`, retrying once with [`FALLBACK_COMMAND`] appended when no
    /// command was given.
    fn parse(&self, root: &StorageRoot, mut args: Vec<String>) -> Result<OptionSet, ParseError> {
        let mut attempt = Attempt::Initial;
        loop {
            match (self.parser.parse(root, &args, true), attempt) {
                (Ok(options), _) => return Ok(options),
                (Err(err), Attempt::Initial) if err.is_command_required() => {
                    tracing::debug!("command required, retrying as '{FALLBACK_COMMAND}'");
                    args.push(FALLBACK_COMMAND.to_owned());
                    attempt = Attempt::Fallback;
                }
                (Err(err), _) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::OptionSource;
    use crate::error::LogError;
    use crate::logging::{LogLevel, LogSettings};
    use mockall::predicate::eq;
    use mockall::{Sequence, mock};

    mock! {
        Parser {}
        impl ArgParser for Parser {
            fn parse(
                &self,
                root: &StorageRoot,
                args: &[String],
                strict: bool,
            ) -> Result<OptionSet, ParseError>;
        }
    }

    mock! {
        Host {}
        impl Host for Host {
            fn current_dir(&self) -> std::io::Result<String>;
            fn init_logging(&self, settings: &LogSettings) -> Result<(), LogError>;
            fn neutralize_umask(&self);
            fn set_io_buffer_size(&self, size: usize);
            fn command_begin(&self, options: &OptionSet);
        }
    }

    impl std::fmt::Debug for MockParser {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("MockParser")
        }
    }

    impl std::fmt::Debug for MockHost {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("MockHost")
        }
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    fn test_options() -> OptionSet {
        OptionSet::new(CommandId::Test)
            .with(OptionId::LogLevel, OptionSource::Param, "info")
            .with(OptionId::LogTimestamp, OptionSource::Default, true)
            .with_negated(OptionId::Config, OptionSource::Param)
            .with(OptionId::NeutralUmask, OptionSource::Default, true)
            .with(OptionId::BufferSize, OptionSource::Default, 65536_usize)
            .with(OptionId::RepoPath, OptionSource::Param, "data")
            .with(OptionId::TestPath, OptionSource::Default, "/tmp/test")
    }

    fn parser_returning(options: OptionSet) -> MockParser {
        let mut parser = MockParser::new();
        parser
            .expect_parse()
            .times(1)
            .returning(move |_, _, _| Ok(options.clone()));
        parser
    }

    /// A host on which no method may be called.
    fn untouched_host() -> MockHost {
        MockHost::new()
    }

    #[test]
    fn debug_shows_collaborators() {
        let parser = MockParser::new();
        let host = untouched_host();
        let bootstrap = Bootstrap::new(&parser, &host, PlatformKind::Windows);
        assert_eq!(
            format!("{bootstrap:?}"),
            "Bootstrap { parser: MockParser, host: MockHost, platform: Windows }"
        );
    }

    #[test]
    fn sentinel_is_appended_to_a_copy() {
        let raw = args(&["harness", "test"]);
        let mut parser = MockParser::new();
        parser
            .expect_parse()
            .withf(|root, args, strict| {
                root.path() == std::path::Path::new("/")
                    && args == ["harness", "test", "--no-config"]
                    && *strict
            })
            .times(1)
            .returning(|_, _, _| Ok(OptionSet::new(CommandId::Version)));
        let host = untouched_host();

        Bootstrap::new(&parser, &host, PlatformKind::Posix)
            .run(&raw)
            .unwrap();
        assert_eq!(raw, ["harness", "test"], "input must not be mutated");
    }

    #[test]
    fn windows_root_is_drive_rooted() {
        let mut parser = MockParser::new();
        parser
            .expect_parse()
            .withf(|root, _, _| root.path() == std::path::Path::new("C:\\"))
            .times(1)
            .returning(|_, _, _| Ok(OptionSet::new(CommandId::None)));
        let host = untouched_host();

        Bootstrap::new(&parser, &host, PlatformKind::Windows)
            .run(&args(&["harness"]))
            .unwrap();
    }

    #[test]
    fn command_required_retries_once_with_fallback() {
        let mut seq = Sequence::new();
        let mut parser = MockParser::new();
        parser
            .expect_parse()
            .withf(|_, args, _| args == ["harness", "--no-config"])
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Err(ParseError::CommandRequired));
        parser
            .expect_parse()
            .withf(|_, args, _| args == ["harness", "--no-config", "test"])
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(OptionSet::new(CommandId::Version)));
        let host = untouched_host();

        let options = Bootstrap::new(&parser, &host, PlatformKind::Posix)
            .run(&args(&["harness"]))
            .unwrap();
        assert_eq!(options.command(), CommandId::Version);
    }

    #[test]
    fn second_command_required_is_not_retried() {
        let mut parser = MockParser::new();
        parser
            .expect_parse()
            .times(2)
            .returning(|_, _, _| Err(ParseError::CommandRequired));
        let host = untouched_host();

        let err = Bootstrap::new(&parser, &host, PlatformKind::Posix)
            .run(&args(&["harness"]))
            .unwrap_err();
        assert!(
            matches!(err, BootstrapError::Parse(ParseError::CommandRequired)),
            "got {err}"
        );
    }

    #[test]
    fn other_parse_errors_are_not_retried() {
        let mut parser = MockParser::new();
        parser.expect_parse().times(1).returning(|_, _, _| {
            Err(ParseError::ConfigUnknownKey {
                path: "/etc/harness/harness.toml".into(),
                key: "bogus".to_owned(),
            })
        });
        let host = untouched_host();

        let err = Bootstrap::new(&parser, &host, PlatformKind::Posix)
            .run(&args(&["harness", "test"]))
            .unwrap_err();
        assert!(
            matches!(err, BootstrapError::Parse(ParseError::ConfigUnknownKey { .. })),
            "got {err}"
        );
    }

    #[test]
    fn placeholder_command_is_rejected_before_side_effects() {
        let parser = parser_returning(OptionSet::new(CommandId::Noop));
        let host = untouched_host();

        let err = Bootstrap::new(&parser, &host, PlatformKind::Posix)
            .run(&args(&["harness", "noop"]))
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid command 'noop'");
    }

    #[test]
    fn informational_commands_touch_nothing() {
        for command in [CommandId::None, CommandId::Help, CommandId::Version] {
            let parser = parser_returning(OptionSet::new(command));
            let host = untouched_host();
            let options = Bootstrap::new(&parser, &host, PlatformKind::Posix)
                .run(&args(&["harness"]))
                .unwrap();
            assert_eq!(options.command(), command);
        }
    }

    #[test]
    fn post_parse_steps_run_in_order() {
        let parser = parser_returning(test_options());
        let mut seq = Sequence::new();
        let mut host = MockHost::new();
        host.expect_current_dir()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok("/work".to_owned()));
        host.expect_init_logging()
            .withf(|settings| {
                *settings
                    == LogSettings {
                        console: LogLevel::Info,
                        stderr: LogLevel::Off,
                        file: LogLevel::Off,
                        timestamp: true,
                    }
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        host.expect_neutralize_umask()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        host.expect_set_io_buffer_size()
            .with(eq(65536))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        host.expect_command_begin()
            .withf(|options| {
                options.str(OptionId::RepoPath) == Ok("/work/data")
                    && !options.valid(OptionId::Config)
            })
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());

        let options = Bootstrap::new(&parser, &host, PlatformKind::Posix)
            .run(&args(&["harness", "test", "--repo-path=data"]))
            .unwrap();
        assert_eq!(options.str(OptionId::RepoPath).unwrap(), "/work/data");
        assert_eq!(options.source(OptionId::RepoPath), Some(OptionSource::Param));
        assert_eq!(options.str(OptionId::TestPath).unwrap(), "/tmp/test");
    }

    #[test]
    fn help_variant_skips_logging_only() {
        let parser = parser_returning(test_options().with_help(true));
        let mut host = MockHost::new();
        host.expect_current_dir()
            .returning(|| Ok("/work".to_owned()));
        host.expect_init_logging().never();
        host.expect_neutralize_umask().times(1).return_const(());
        host.expect_set_io_buffer_size().times(1).return_const(());
        host.expect_command_begin().times(1).return_const(());

        Bootstrap::new(&parser, &host, PlatformKind::Posix)
            .run(&args(&["harness", "test", "--help"]))
            .unwrap();
    }

    #[test]
    fn umask_kept_when_disabled() {
        let options = test_options().with(OptionId::NeutralUmask, OptionSource::Param, false);
        let parser = parser_returning(options);
        let mut host = MockHost::new();
        host.expect_current_dir()
            .returning(|| Ok("/work".to_owned()));
        host.expect_init_logging().returning(|_| Ok(()));
        host.expect_neutralize_umask().never();
        host.expect_set_io_buffer_size().return_const(());
        host.expect_command_begin().return_const(());

        Bootstrap::new(&parser, &host, PlatformKind::Posix)
            .run(&args(&["harness", "test", "--no-neutral-umask"]))
            .unwrap();
    }

    #[test]
    fn undeclared_options_are_skipped() {
        // Only the log options are declared; umask and buffer size steps do not run.
        let options = OptionSet::new(CommandId::Test)
            .with(OptionId::LogLevel, OptionSource::Default, "warn");
        let parser = parser_returning(options);
        let mut host = MockHost::new();
        host.expect_current_dir()
            .returning(|| Ok("/work".to_owned()));
        host.expect_init_logging()
            .withf(|settings| settings.console == LogLevel::Warn)
            .times(1)
            .returning(|_| Ok(()));
        host.expect_neutralize_umask().never();
        host.expect_set_io_buffer_size().never();
        host.expect_command_begin().times(1).return_const(());

        Bootstrap::new(&parser, &host, PlatformKind::Posix)
            .run(&args(&["harness", "test"]))
            .unwrap();
    }

    #[test]
    fn cwd_failure_leaves_process_untouched() {
        let parser = parser_returning(test_options());
        let mut host = MockHost::new();
        host.expect_current_dir().times(1).returning(|| {
            Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "deleted",
            ))
        });
        host.expect_init_logging().never();
        host.expect_neutralize_umask().never();
        host.expect_set_io_buffer_size().never();
        host.expect_command_begin().never();

        let err = Bootstrap::new(&parser, &host, PlatformKind::Posix)
            .run(&args(&["harness", "test"]))
            .unwrap_err();
        assert!(matches!(err, BootstrapError::CurrentDir(_)), "got {err}");
        assert_eq!(err.to_string(), "unable to get cwd");
    }

    #[test]
    fn windows_paths_use_forward_slash_cwd() {
        let options = test_options()
            .with(OptionId::RepoPath, OptionSource::Param, "rel\\y")
            .with(OptionId::TestPath, OptionSource::Param, "C:\\x");
        let parser = parser_returning(options);
        let mut host = MockHost::new();
        host.expect_current_dir()
            .returning(|| Ok("C:\\work".to_owned()));
        host.expect_init_logging().returning(|_| Ok(()));
        host.expect_neutralize_umask().return_const(());
        host.expect_set_io_buffer_size().return_const(());
        host.expect_command_begin().return_const(());

        let options = Bootstrap::new(&parser, &host, PlatformKind::Windows)
            .run(&args(&["harness.exe", "test"]))
            .unwrap();
        assert_eq!(options.str(OptionId::RepoPath).unwrap(), "C:/work/rel\\y");
        assert_eq!(options.str(OptionId::TestPath).unwrap(), "C:\\x");
    }
}
