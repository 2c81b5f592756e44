//! Diagnostics sinks for debug-synchronous launches
//!
//! When an operation runs with `debug_synchronous = true` the launch driver
//! drains the stream after every internal stage and hands a
//! [`DiagnosticRecord`] to the client's sink. In asynchronous mode sinks are
//! never called.

use parking_lot::Mutex;
use std::fmt;
use std::time::Duration;

/// One timed stage of an operation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticRecord {
    /// Kernel or stage name, e.g. `"merge_path_partition_kernel"`
    pub name: &'static str,
    /// Number of elements the stage processed
    pub size: usize,
    /// Wall time from the stage's launch until the stream drained
    pub elapsed: Duration,
}

impl fmt::Display for DiagnosticRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}) {:.3} ms",
            self.name,
            self.size,
            self.elapsed.as_secs_f64() * 1e3
        )
    }
}

/// Receiver of debug-synchronous timing records
pub trait DiagnosticsSink: Send + Sync {
    /// Record one completed stage
    fn record(&self, record: DiagnosticRecord);
}

/// Forwards records as `tracing` debug events
///
/// This is the default sink of every client. Events are emitted on target
/// `tileprim::diagnostics`, so they can be filtered independently of the
/// rest of the crate's logging.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn record(&self, record: DiagnosticRecord) {
        tracing::debug!(
            target: "tileprim::diagnostics",
            name = record.name,
            size = record.size,
            elapsed_ms = record.elapsed.as_secs_f64() * 1e3,
            "stage complete"
        );
    }
}

/// Keeps every record in memory, in arrival order
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<DiagnosticRecord>>,
}

impl RecordingSink {
    /// Create an empty recording sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records collected so far
    pub fn records(&self) -> Vec<DiagnosticRecord> {
        self.records.lock().clone()
    }

    /// Stage names collected so far
    pub fn names(&self) -> Vec<&'static str> {
        self.records.lock().iter().map(|r| r.name).collect()
    }

    /// Remove and return all records
    pub fn take(&self) -> Vec<DiagnosticRecord> {
        std::mem::take(&mut *self.records.lock())
    }
}

impl DiagnosticsSink for RecordingSink {
    fn record(&self, record: DiagnosticRecord) {
        self.records.lock().push(record);
    }
}

/// Discards all records
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl DiagnosticsSink for NullSink {
    fn record(&self, _record: DiagnosticRecord) {}
}
