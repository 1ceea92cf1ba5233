//! Event sink trait and implementations.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn, Level};

use crate::core::{FieldValue, Record};
use crate::stores::RecordStore;
use crate::utils::timestamps::{format_timestamp, Clock};

/// Trait for event sinks that can receive events.
///
/// Implementations must not propagate delivery failures.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Emits an event.
    ///
    /// # Arguments
    ///
    /// * `event_type` - The type of event (e.g., "record.created")
    /// * `data` - Optional event data
    async fn emit(&self, event_type: &str, data: Option<serde_json::Value>);
}

/// A no-op event sink that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event_type: &str, _data: Option<serde_json::Value>) {}
}

/// An event sink that logs events using the tracing framework.
///
/// Used as the default when no sink is configured.
#[derive(Debug, Clone)]
pub struct LoggingEventSink {
    level: Level,
}

impl Default for LoggingEventSink {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl LoggingEventSink {
    /// Creates a new logging event sink with the specified level.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level logging sink.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }

    /// Creates an info-level logging sink.
    #[must_use]
    pub fn info() -> Self {
        Self::new(Level::INFO)
    }
}

#[async_trait]
impl EventSink for LoggingEventSink {
    async fn emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        if self.level == Level::DEBUG {
            debug!(event_type = %event_type, event_data = ?data, "Event: {}", event_type);
        } else {
            info!(event_type = %event_type, event_data = ?data, "Event: {}", event_type);
        }
    }
}

/// A collecting event sink for testing purposes.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: parking_lot::RwLock<Vec<(String, Option<serde_json::Value>)>>,
}

impl CollectingEventSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    #[must_use]
    pub fn events(&self) -> Vec<(String, Option<serde_json::Value>)> {
        self.events.read().clone()
    }

    /// Returns the number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if no events have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Returns events matching a type prefix.
    #[must_use]
    pub fn events_of_type(&self, type_prefix: &str) -> Vec<(String, Option<serde_json::Value>)> {
        self.events
            .read()
            .iter()
            .filter(|(t, _)| t.starts_with(type_prefix))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EventSink for CollectingEventSink {
    async fn emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.events.write().push((event_type.to_string(), data));
    }
}

/// An event sink appending one row per event to a record store.
///
/// Rows carry the fields `Timestamp`, `Event`, `Row` and `Detail`.
pub struct RecordStoreEventSink {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
}

impl RecordStoreEventSink {
    /// Creates a sink writing to `store`, stamping rows with `clock`.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    fn log_row(&self, event_type: &str, data: Option<&serde_json::Value>) -> Record {
        let row = data
            .and_then(|d| d.get("row"))
            .map_or(FieldValue::Empty, FieldValue::from_json);
        let detail = data
            .map(|d| FieldValue::text(d.to_string()))
            .unwrap_or_default();

        Record::new()
            .with("Timestamp", format_timestamp(&self.clock.now()))
            .with("Event", event_type)
            .with("Row", row)
            .with("Detail", detail)
    }
}

impl std::fmt::Debug for RecordStoreEventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStoreEventSink").finish_non_exhaustive()
    }
}

#[async_trait]
impl EventSink for RecordStoreEventSink {
    async fn emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        let row = self.log_row(event_type, data.as_ref());
        if let Err(e) = self.store.append_row(&row).await {
            warn!(event_type = %event_type, error = %e, "Failed to append event to log store");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::InMemoryRecordStore;
    use crate::utils::timestamps::FixedClock;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_noop_sink() {
        let sink = NoOpEventSink;
        sink.emit("test", Some(serde_json::json!({"x": 1}))).await;
    }

    #[tokio::test]
    async fn test_logging_sink() {
        LoggingEventSink::default()
            .emit("test.event", Some(serde_json::json!({"key": "value"})))
            .await;
        LoggingEventSink::debug().emit("test.event", None).await;
    }

    #[tokio::test]
    async fn test_collecting_sink_filter() {
        let sink = CollectingEventSink::new();
        assert!(sink.is_empty());

        sink.emit("record.created", None).await;
        sink.emit("record.failed", None).await;
        sink.emit("batch.completed", None).await;

        assert_eq!(sink.len(), 3);
        assert_eq!(sink.events_of_type("record.").len(), 2);
        assert_eq!(sink.events()[2].0, "batch.completed");
    }

    #[tokio::test]
    async fn test_record_store_sink_appends_rows() {
        let store = Arc::new(InMemoryRecordStore::new(Vec::new()));
        let clock = FixedClock::at_utc(
            NaiveDate::from_ymd_opt(2024, 1, 5)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        );
        let sink = RecordStoreEventSink::new(store.clone(), Arc::new(clock));

        sink.emit("record.failed", Some(serde_json::json!({"row": 4, "error": "boom"})))
            .await;

        let row = store.read_row(0).await.unwrap();
        assert_eq!(row.get("Timestamp"), Some(&FieldValue::text("2024-01-05 09:00:00")));
        assert_eq!(row.get("Event"), Some(&FieldValue::text("record.failed")));
        assert_eq!(row.get("Row"), Some(&FieldValue::Number(4.0)));
        assert!(row
            .get("Detail")
            .and_then(FieldValue::as_text)
            .unwrap()
            .contains("boom"));
    }
}
