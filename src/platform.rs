//! Path conventions of the host platform.
use std::fmt;

/// Filesystem convention used for root detection and absolute-path tests.
///
/// Selected once at process start with [`PlatformKind::detect`] and passed
/// explicitly afterwards, so both conventions can be exercised from the same
/// test binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformKind {
    /// `/`-rooted paths.
    Posix,
    /// Drive-letter and UNC paths.
    Windows,
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Posix => write!(f, "posix"),
            Self::Windows => write!(f, "windows"),
        }
    }
}

impl PlatformKind {
    /// Detect the convention of the platform this binary was built for.
    #[must_use]
    pub const fn detect() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Posix
        }
    }

    /// Filesystem root handed to the storage layer.
    #[must_use]
    pub const fn root(self) -> &'static str {
        match self {
            Self::Posix => "/",
            Self::Windows => "C:\\",
        }
    }

    /// Returns `true` if `path` is already absolute under this convention.
    ///
    /// Windows accepts UNC paths (`\\server\share`) and anything carrying a
    /// drive separator.
    #[must_use]
    pub fn is_absolute(self, path: &str) -> bool {
        match self {
            Self::Posix => path.starts_with('/'),
            Self::Windows => path.starts_with("\\\\") || path.contains(':'),
        }
    }

    /// Rewrite a working directory into the form used for path joins.
    #[must_use]
    pub fn normalize_dir(self, dir: &str) -> String {
        match self {
            Self::Posix => dir.to_owned(),
            Self::Windows => dir.replace('\\', "/"),
        }
    }
}
