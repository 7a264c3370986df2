//! Extension function bodies and their calling convention.

use std::sync::Arc;

use tether_diagnostic::{DiagnosticSink, ErrorCode};
use tether_value::Value;

use crate::{Candidate, FunctionSignature, VersionKey};

/// Failure produced by an extension function itself.
///
/// The resolver never creates, wraps or inspects these; it hands them back
/// to the caller exactly as the callee returned them.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ExtensionError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ExtensionError {
    pub fn new(message: impl Into<String>) -> Self {
        ExtensionError {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ExtensionError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

static NULL_VALUE: Value = Value::Null;

/// What an extension function returns.
pub type ExtensionResult = Result<Value, ExtensionError>;

/// A registered extension function body.
pub type ExtensionFn = Arc<dyn Fn(&Invocation<'_>) -> ExtensionResult + Send + Sync>;

/// Everything an extension function sees when it runs.
pub struct Invocation<'a> {
    candidate: &'a Candidate,
    /// Receiver first, then the remaining arguments.
    args: &'a [Value],
    diagnostics: &'a DiagnosticSink,
}

impl<'a> Invocation<'a> {
    pub(crate) fn new(
        candidate: &'a Candidate,
        args: &'a [Value],
        diagnostics: &'a DiagnosticSink,
    ) -> Self {
        Invocation {
            candidate,
            args,
            diagnostics,
        }
    }

    pub fn receiver(&self) -> &Value {
        self.args.first().unwrap_or(&NULL_VALUE)
    }

    /// Arguments after the receiver.
    pub fn args(&self) -> &[Value] {
        self.args.get(1..).unwrap_or_default()
    }

    /// Argument `index`, counting from the first argument after the receiver.
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args().get(index)
    }

    pub fn signature(&self) -> &FunctionSignature {
        self.candidate.signature()
    }

    /// Version key of the function being run.
    pub fn version_key(&self) -> &VersionKey {
        self.candidate.key()
    }

    /// Record a recoverable problem instead of failing the whole call.
    pub fn report(&self, message: impl std::fmt::Display) {
        self.diagnostics.warning(
            ErrorCode::E3001,
            format!("{}: {message}", self.candidate.key()),
        );
    }
}
