//! Diagnostics for the extension runtime.
//!
//! Resolution failures are ordinary outcomes, not errors: the resolver
//! returns a failure flag and appends a [`DiagnosticRecord`] here. The sink
//! is append-only and is never consulted for control flow.
//!
//! ```text
//! let sink = DiagnosticSink::new(DiagnosticConfig::default());
//! sink.warning(ErrorCode::E1001, "extension function `Length` not found for `geo.Point`");
//! assert!(sink.contains_code(ErrorCode::E1001));
//! ```

mod diagnostic;
mod error_code;
mod sink;

pub use diagnostic::{DiagnosticRecord, Severity};
pub use error_code::{ErrorCode, ParseErrorCodeError};
pub use sink::{DiagnosticConfig, DiagnosticSink};
