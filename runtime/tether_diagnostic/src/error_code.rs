//! Error codes for runtime diagnostics.
//!
//! Format: E#### where the first digit names the reporting component:
//! - E1xxx: extension resolution
//! - E2xxx: version keys and upgrade records
//! - E3xxx: problems recorded by extension functions themselves

use std::fmt;

/// Error codes for all runtime diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Resolution (E1xxx)
    /// No extension function matched the receiver and argument types
    E1001,
    /// Extension call on a null receiver
    E1002,

    // Versioning (E2xxx)
    /// Version key matches no registered function or upgrade record
    E2001,
    /// Upgrade records form a cycle
    E2002,

    // Extension functions (E3xxx)
    /// Problem reported by an extension function
    E3001,
}

/// Error returned when parsing an unknown code string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseErrorCodeError(pub String);

impl fmt::Display for ParseErrorCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown error code `{}`", self.0)
    }
}

impl std::error::Error for ParseErrorCodeError {}

impl ErrorCode {
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E3001,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E3001 => "E3001",
        }
    }

    /// One-line description for `--explain`-style output.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "extension function not found",
            ErrorCode::E1002 => "extension function called on a null receiver",
            ErrorCode::E2001 => "unknown version key",
            ErrorCode::E2002 => "cycle in upgrade records",
            ErrorCode::E3001 => "problem reported by extension function",
        }
    }

    pub fn is_resolution_error(&self) -> bool {
        matches!(self, ErrorCode::E1001 | ErrorCode::E1002)
    }

    pub fn is_versioning_error(&self) -> bool {
        matches!(self, ErrorCode::E2001 | ErrorCode::E2002)
    }

    pub fn is_callee_report(&self) -> bool {
        matches!(self, ErrorCode::E3001)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ErrorCode {
    type Err = ParseErrorCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorCode::ALL
            .iter()
            .copied()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| ParseErrorCodeError(s.to_owned()))
    }
}
