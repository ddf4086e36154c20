//! Test harness command-line engine.
//!
//! Every invocation runs the same bootstrap before any command body: parse
//! arguments (retrying once with the default command), then prime the process
//! with logging, umask, IO buffer size and absolute path options.
//!
//! The public API is organised into these layers:
//!
//! - **[`cli`]**: the clap argument definition
//! - **[`config`]**: option resolution, config files and the [`config::Bootstrap`] sequence
//! - **[`host`]**: process-wide side effects behind the [`host::Host`] trait
//! - **[`command`]**: command begin/end reporting and help rendering
//! - **[`logging`]**, **[`io`]**, **[`platform`]**: supporting services
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod host;
pub mod io;
pub mod logging;
pub mod platform;
