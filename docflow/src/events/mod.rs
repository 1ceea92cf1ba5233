//! Event sinks: the pluggable log sink for generation outcomes.
//!
//! Every terminal record state and every finished batch is emitted as an
//! event. Sinks never fail the caller; delivery errors are logged and
//! dropped.

mod sink;

pub use sink::{
    CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink, RecordStoreEventSink,
};

/// Emitted when an artifact was created for a record.
pub const RECORD_CREATED: &str = "record.created";
/// Emitted when a record was skipped by a guard.
pub const RECORD_SKIPPED: &str = "record.skipped";
/// Emitted when materialization or write-back failed.
pub const RECORD_FAILED: &str = "record.failed";
/// Emitted after a batch run.
pub const BATCH_COMPLETED: &str = "batch.completed";
