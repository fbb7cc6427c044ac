//! Exit code definitions for the gdrive CLI
//!
//! These codes are part of the CLI contract; scripts key off them.

/// Exit codes for the gdrive CLI application.
///
/// These codes follow a consistent convention to allow scripts and automation
/// to handle different error scenarios appropriately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Operation completed successfully
    Success = 0,

    /// General/unspecified error
    GeneralError = 1,

    /// User input error: invalid arguments, malformed secret or config file
    UsageError = 2,

    /// Network error: timeout, connection reset, unexpected provider response
    NetworkError = 3,

    /// Authentication or permission failure
    AuthError = 4,

    /// Resource not found: remote file, credential file or secret file missing
    NotFound = 5,

    /// Provider quota or rate limit exceeded
    QuotaExceeded = 6,
}

impl ExitCode {
    /// Convert exit code to i32 for use with std::process::exit
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Create exit code from i32 value
    ///
    /// Returns None if the value doesn't correspond to a known exit code.
    pub const fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::GeneralError),
            2 => Some(Self::UsageError),
            3 => Some(Self::NetworkError),
            4 => Some(Self::AuthError),
            5 => Some(Self::NotFound),
            6 => Some(Self::QuotaExceeded),
            _ => None,
        }
    }

    /// Map a core error onto its exit code
    pub fn from_error(err: &gd_core::Error) -> Self {
        match Self::from_i32(err.exit_code()) {
            Some(code) => code,
            None => Self::GeneralError,
        }
    }

    /// Get a human-readable description of the exit code
    pub const fn description(self) -> &'static str {
        match self {
            Self::Success => "Operation completed successfully",
            Self::GeneralError => "General error",
            Self::UsageError => "Invalid arguments or malformed input file",
            Self::NetworkError => "Network error",
            Self::AuthError => "Authentication or permission failure",
            Self::NotFound => "Resource not found",
            Self::QuotaExceeded => "Provider quota exceeded",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}
