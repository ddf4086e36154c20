//! Process-wide side effects applied by the bootstrap.
//!
//! Provides the [`Host`] trait so that the bootstrap sequence can be
//! unit-tested without touching the real umask, the global subscriber or
//! the IO defaults.  Production code uses [`SystemHost`].

use std::io;

use crate::command;
use crate::config::OptionSet;
use crate::error::LogError;
use crate::logging::{self, LogSettings};

/// Process state the bootstrap reads or mutates, in the order it does so.
pub trait Host: std::fmt::Debug {
    /// Current working directory as a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be determined.
    fn current_dir(&self) -> io::Result<String>;

    /// Initialise logging with `settings`.
    ///
    /// # Errors
    ///
    /// Returns an error if logging was already initialised.
    fn init_logging(&self, settings: &LogSettings) -> Result<(), LogError>;

    /// Clear the file-creation mask so created files get the modes requested.
    fn neutralize_umask(&self);

    /// Set the default IO buffer size.
    fn set_io_buffer_size(&self, size: usize);

    /// Signal that bootstrap finished and the command may run.
    fn command_begin(&self, options: &OptionSet);
}

/// Production [`Host`] acting on the running process.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHost;

impl Host for SystemHost {
    fn current_dir(&self) -> io::Result<String> {
        std::env::current_dir()?
            .into_os_string()
            .into_string()
            .map_err(|_| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    "current directory is not valid UTF-8",
                )
            })
    }

    fn init_logging(&self, settings: &LogSettings) -> Result<(), LogError> {
        logging::init_subscriber(settings)
    }

    fn neutralize_umask(&self) {
        #[cfg(unix)]
        // SAFETY: umask only swaps the process file-creation mask and cannot fail.
        #[allow(unsafe_code)]
        unsafe {
            libc::umask(0);
        }
    }

    fn set_io_buffer_size(&self, size: usize) {
        crate::io::set_buffer_size(size);
    }

    fn command_begin(&self, options: &OptionSet) {
        command::begin(options);
    }
}
