//! Append-only diagnostics sink.
//!
//! Shared by every resolver call in a runtime. Appends take a short
//! `parking_lot::Mutex`; readers only ever get snapshots. Ordering between
//! records appended from different threads is unspecified.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::{DiagnosticRecord, ErrorCode, Severity};

/// Configuration for the diagnostics sink.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of records kept (0 = unlimited). Records past the
    /// limit are counted and dropped; stored records are never removed.
    pub record_limit: usize,
    /// Also emit each record as a `tracing` event.
    pub mirror_to_tracing: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            record_limit: 0,
            mirror_to_tracing: true,
        }
    }
}

impl DiagnosticConfig {
    /// Unlimited and not mirrored to tracing (for tests).
    pub fn quiet() -> Self {
        DiagnosticConfig {
            record_limit: 0,
            mirror_to_tracing: false,
        }
    }
}

struct SinkInner {
    records: Mutex<Vec<DiagnosticRecord>>,
    rejected: AtomicUsize,
    config: DiagnosticConfig,
}

/// Cloneable handle to an append-only diagnostics sink.
#[derive(Clone)]
pub struct DiagnosticSink {
    inner: Arc<SinkInner>,
}

impl DiagnosticSink {
    pub fn new(config: DiagnosticConfig) -> Self {
        DiagnosticSink {
            inner: Arc::new(SinkInner {
                records: Mutex::new(Vec::new()),
                rejected: AtomicUsize::new(0),
                config,
            }),
        }
    }

    pub fn config(&self) -> &DiagnosticConfig {
        &self.inner.config
    }

    /// Append a record.
    ///
    /// Returns `false` if the record limit was reached and the record was
    /// dropped.
    pub fn record(&self, record: DiagnosticRecord) -> bool {
        let config = &self.inner.config;
        let mut records = self.inner.records.lock();
        if config.record_limit > 0 && records.len() >= config.record_limit {
            self.inner.rejected.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        if config.mirror_to_tracing {
            mirror(&record);
        }
        records.push(record);
        true
    }

    pub fn error(&self, code: ErrorCode, message: impl Into<String>) -> bool {
        self.record(DiagnosticRecord::new(Severity::Error, code, message))
    }

    pub fn warning(&self, code: ErrorCode, message: impl Into<String>) -> bool {
        self.record(DiagnosticRecord::new(Severity::Warning, code, message))
    }

    pub fn note(&self, code: ErrorCode, message: impl Into<String>) -> bool {
        self.record(DiagnosticRecord::new(Severity::Note, code, message))
    }

    pub fn len(&self) -> usize {
        self.inner.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of records dropped because of `record_limit`.
    pub fn rejected(&self) -> usize {
        self.inner.rejected.load(Ordering::Relaxed)
    }

    /// Copy of all records appended so far.
    pub fn snapshot(&self) -> Vec<DiagnosticRecord> {
        self.inner.records.lock().clone()
    }

    pub fn count_code(&self, code: ErrorCode) -> usize {
        self.inner
            .records
            .lock()
            .iter()
            .filter(|r| r.code == code)
            .count()
    }

    pub fn contains_code(&self, code: ErrorCode) -> bool {
        self.count_code(code) > 0
    }

    /// Consume this handle at shutdown and return every record.
    ///
    /// Moves the records out when this is the last handle; otherwise other
    /// handles keep the sink alive and a copy is returned.
    pub fn into_records(self) -> Vec<DiagnosticRecord> {
        match Arc::try_unwrap(self.inner) {
            Ok(inner) => inner.records.into_inner(),
            Err(shared) => shared.records.lock().clone(),
        }
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new(DiagnosticConfig::default())
    }
}

impl fmt::Debug for DiagnosticSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticSink")
            .field("records", &self.len())
            .field("rejected", &self.rejected())
            .field("config", &self.inner.config)
            .finish()
    }
}

/// Only stored records are mirrored.
fn mirror(record: &DiagnosticRecord) {
    match record.severity {
        Severity::Error => tracing::error!(code = %record.code, "{}", record.message),
        Severity::Warning => tracing::warn!(code = %record.code, "{}", record.message),
        Severity::Note => tracing::debug!(code = %record.code, "{}", record.message),
    }
}
