//! Platform family detection
//!
//! The build specification only distinguishes two linkage conventions:
//! Windows-family (module-definition files, MSVC compatibility macros) and
//! POSIX-like. Adding a family here forces every `match` on it to make an
//! explicit decision.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("Unsupported platform '{identifier}': no linkage convention is defined for it")]
    UnsupportedPlatform { identifier: String },
}

/// Coarse OS classification used to select linker and macro overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformFamily {
    /// Windows, Cygwin, `MinGW`
    Windows,
    /// Linux, macOS, the BSDs and other Unix-likes
    Posix,
}

/// Cached detection of the host family (computed once, reused throughout execution)
static CURRENT_FAMILY: LazyLock<Result<PlatformFamily, PlatformError>> =
    LazyLock::new(|| env::consts::FAMILY.parse());

impl PlatformFamily {
    /// Family of the platform this binary was built for.
    pub fn detect() -> Result<Self, PlatformError> {
        CURRENT_FAMILY.clone()
    }

    /// Resolve the platform signal: an explicit identifier wins, then
    /// `EXTPACK_PLATFORM`, then the host family.
    pub fn resolve(explicit: Option<&str>) -> Result<Self, PlatformError> {
        match explicit
            .map(ToString::to_string)
            .or_else(crate::env_vars::extpack_platform)
        {
            Some(identifier) => identifier.parse(),
            None => Self::detect(),
        }
    }

    #[must_use]
    pub const fn is_windows(self) -> bool {
        matches!(self, Self::Windows)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Posix => "posix",
        }
    }
}

impl FromStr for PlatformFamily {
    type Err = PlatformError;

    /// Accepts host-convention identifiers (`win32`, `linux`, `darwin`, ...)
    /// as well as Rust's `std::env::consts::FAMILY` and `OS` values.
    fn from_str(identifier: &str) -> Result<Self, Self::Err> {
        let normalized = identifier.trim().to_lowercase();

        let family = match normalized.as_str() {
            "windows" | "win32" | "win64" => Some(Self::Windows),
            // GCC toolchains on Windows hosts (cygwin, msys, mingw*) take
            // the POSIX link arguments
            "unix" | "posix" | "linux" | "darwin" | "macos" | "freebsd" | "openbsd"
            | "netbsd" | "dragonfly" | "solaris" | "illumos" | "aix" | "android" | "ios"
            | "cygwin" | "msys" => Some(Self::Posix),
            s => s.starts_with("mingw").then_some(Self::Posix),
        };

        family.ok_or_else(|| PlatformError::UnsupportedPlatform {
            identifier: identifier.to_string(),
        })
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
