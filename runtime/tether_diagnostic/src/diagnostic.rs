//! Diagnostic records.

use std::fmt;
use std::time::SystemTime;

use crate::ErrorCode;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// One entry in the diagnostics sink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticRecord {
    /// Wall-clock time the record was appended.
    pub timestamp: SystemTime,
    pub severity: Severity,
    pub code: ErrorCode,
    pub message: String,
}

impl DiagnosticRecord {
    pub fn new(severity: Severity, code: ErrorCode, message: impl Into<String>) -> Self {
        DiagnosticRecord {
            timestamp: SystemTime::now(),
            severity,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for DiagnosticRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)
    }
}
