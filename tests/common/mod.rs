// Shared helpers for integration tests.
//
// Provides a host that records every process-level call the bootstrap makes
// instead of performing it, so the real parser can be driven end to end
// without touching the umask, the global subscriber or the IO defaults.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code, missing_docs)]

use std::collections::VecDeque;
use std::io;
use std::sync::{Mutex, PoisonError};

use harness_cli::config::{ArgParser, OptionSet, StorageRoot};
use harness_cli::error::{LogError, ParseError};
use harness_cli::host::Host;
use harness_cli::logging::LogSettings;

/// One call made against a [`RecordingHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    CurrentDir,
    InitLogging(LogSettings),
    NeutralizeUmask,
    SetIoBufferSize(usize),
    CommandBegin(OptionSet),
}

/// [`Host`] that records calls and reports a fixed working directory.
#[derive(Debug)]
pub struct RecordingHost {
    cwd: Option<String>,
    calls: Mutex<Vec<HostCall>>,
}

impl RecordingHost {
    /// Host whose working directory is `cwd`.
    pub fn new(cwd: &str) -> Self {
        Self {
            cwd: Some(cwd.to_owned()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Host whose working directory cannot be determined.
    pub fn without_cwd() -> Self {
        Self {
            cwd: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Calls recorded so far, in order.
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: HostCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

impl Host for RecordingHost {
    fn current_dir(&self) -> io::Result<String> {
        self.record(HostCall::CurrentDir);
        self.cwd
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "cwd removed"))
    }

    fn init_logging(&self, settings: &LogSettings) -> Result<(), LogError> {
        self.record(HostCall::InitLogging(*settings));
        Ok(())
    }

    fn neutralize_umask(&self) {
        self.record(HostCall::NeutralizeUmask);
    }

    fn set_io_buffer_size(&self, size: usize) {
        self.record(HostCall::SetIoBufferSize(size));
    }

    fn command_begin(&self, options: &OptionSet) {
        self.record(HostCall::CommandBegin(options.clone()));
    }
}

/// [`ArgParser`] that replays queued outcomes and records every argument list.
#[derive(Debug)]
pub struct ScriptedParser {
    outcomes: Mutex<VecDeque<Result<OptionSet, ParseError>>>,
    seen: Mutex<Vec<Vec<String>>>,
}

impl ScriptedParser {
    /// Parser returning `outcomes` in order; runs out into `CommandRequired`.
    pub fn new(outcomes: Vec<Result<OptionSet, ParseError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Argument lists passed to `parse`, one per attempt.
    pub fn seen(&self) -> Vec<Vec<String>> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ArgParser for ScriptedParser {
    fn parse(&self, _root: &StorageRoot, args: &[String], _strict: bool) -> Result<OptionSet, ParseError> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(args.to_vec());
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(Err(ParseError::CommandRequired))
    }
}

/// Build an owned argument list.
pub fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(ToString::to_string).collect()
}
