//! Logging levels, settings and the console subscriber.

mod subscriber;
mod types;

pub use subscriber::init_subscriber;
pub use types::{LogLevel, LogSettings, ParseLogLevelError};
