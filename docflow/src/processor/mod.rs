//! Per-record generation pipeline.
//!
//! For one row the processor decides eligibility, materializes the artifact
//! and writes the control fields back. Every failure is contained: it is
//! recorded in the row's status field, logged, emitted to the event sink,
//! and returned as [`GenerationOutcome::Failed`].

mod locks;

pub use locks::{lock_key, RecordLockGuard, RecordLocks};

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::GenerationConfig;
use crate::core::{ArtifactRef, FieldValue, GenerationOutcome, Record, RecordState, SkipReason};
use crate::errors::DocflowError;
use crate::events::{self, EventSink, LoggingEventSink};
use crate::format::is_truthy;
use crate::materializer::DocumentMaterializer;
use crate::stores::RecordStore;
use crate::utils::timestamps::{format_timestamp, Clock};

/// Status text written after a successful generation.
pub const STATUS_DONE: &str = "Done";

/// Whether the trigger flag must be set for a record to be eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerCheck {
    /// The trigger field must hold a truthy value.
    #[default]
    Required,
    /// The invocation itself is the trigger (e.g. a form submission).
    Implicit,
}

/// Result of the guard evaluation for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    /// The record should be materialized.
    Eligible,
    /// A guard rejected the record.
    Skip(SkipReason),
}

/// Runs the generation state machine for single records.
pub struct RecordProcessor {
    config: GenerationConfig,
    records: Arc<dyn RecordStore>,
    materializer: DocumentMaterializer,
    clock: Arc<dyn Clock>,
    events: Arc<dyn EventSink>,
    locks: Arc<RecordLocks>,
}

impl RecordProcessor {
    /// Creates a processor logging events through `tracing`.
    ///
    /// Control field names are trimmed to match record and store keys.
    #[must_use]
    pub fn new(
        mut config: GenerationConfig,
        records: Arc<dyn RecordStore>,
        materializer: DocumentMaterializer,
        clock: Arc<dyn Clock>,
    ) -> Self {
        config.control_fields = config.control_fields.trimmed();
        Self {
            config,
            records,
            materializer,
            clock,
            events: Arc::new(LoggingEventSink::default()),
            locks: Arc::new(RecordLocks::new()),
        }
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Shares a lock set with other processors on the same record store.
    #[must_use]
    pub fn with_locks(mut self, locks: Arc<RecordLocks>) -> Self {
        self.locks = locks;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Returns the record store.
    #[must_use]
    pub fn records(&self) -> &Arc<dyn RecordStore> {
        &self.records
    }

    /// Returns the event sink.
    #[must_use]
    pub fn events(&self) -> &Arc<dyn EventSink> {
        &self.events
    }

    /// Applies the idempotency and trigger guards to a record.
    #[must_use]
    pub fn evaluate(&self, record: &Record) -> Eligibility {
        self.evaluate_with(record, TriggerCheck::Required)
    }

    /// Applies the guards with an explicit trigger policy.
    #[must_use]
    pub fn evaluate_with(&self, record: &Record, check: TriggerCheck) -> Eligibility {
        let fields = &self.config.control_fields;

        if self.config.skip_if_url_exists && !record.is_blank(&fields.url) {
            return Eligibility::Skip(SkipReason::UrlExists);
        }

        if check == TriggerCheck::Required
            && !record.get(&fields.trigger).is_some_and(is_truthy)
        {
            return Eligibility::Skip(SkipReason::NotTriggered);
        }

        Eligibility::Eligible
    }

    /// Processes one row, requiring the trigger flag.
    pub async fn process(&self, index: usize) -> GenerationOutcome {
        self.process_with(index, TriggerCheck::Required).await
    }

    /// Processes one row with an explicit trigger policy.
    ///
    /// Never fails: errors are folded into the returned outcome.
    pub async fn process_with(&self, index: usize, check: TriggerCheck) -> GenerationOutcome {
        let outcome = self.attempt(index, check).await;
        self.emit(index, &outcome).await;
        outcome
    }

    async fn attempt(&self, index: usize, check: TriggerCheck) -> GenerationOutcome {
        let row = index.to_string();
        let key = lock_key(&[
            self.config.template_id.as_str(),
            self.config.output_location_id.as_str(),
            row.as_str(),
        ]);
        let Some(_guard) = self.locks.try_acquire(key) else {
            debug!(row = index, "Record already in progress");
            return GenerationOutcome::skipped(SkipReason::InProgress);
        };

        let record = match self.records.read_row(index).await {
            Ok(record) => record,
            Err(e) => {
                error!(row = index, error = %e, "Failed to read record");
                self.write_failure(index, &e).await;
                return GenerationOutcome::failed(e);
            }
        };

        debug!(row = index, state = %RecordState::Pending, "Record read");

        if let Eligibility::Skip(reason) = self.evaluate_with(&record, check) {
            debug!(row = index, reason = %reason, "Skipping record");
            return GenerationOutcome::skipped(reason);
        }

        info!(
            row = index,
            state = %RecordState::Materializing,
            template_id = %self.config.template_id,
            "Materializing record"
        );
        let artifact = match self
            .materializer
            .materialize(&self.config.template_id, &record, &self.config.naming_pattern)
            .await
        {
            Ok(artifact) => artifact,
            Err(e) => {
                warn!(row = index, kind = %e.kind(), error = %e, "Materialization failed");
                self.write_failure(index, &e).await;
                return GenerationOutcome::failed(e);
            }
        };

        if let Err(e) = self.write_success(index, &artifact).await {
            error!(
                row = index,
                artifact_id = %artifact.id,
                error = %e,
                "Artifact created but write-back failed"
            );
            self.write_failure(index, &e).await;
            return GenerationOutcome::failed(e);
        }

        info!(row = index, artifact_id = %artifact.id, name = %artifact.name, "Record done");
        GenerationOutcome::Created { artifact }
    }

    async fn write_success(&self, index: usize, artifact: &ArtifactRef) -> Result<(), DocflowError> {
        let fields = &self.config.control_fields;
        let generated_at = format_timestamp(&self.clock.now());

        self.records
            .write_field(index, &fields.status, FieldValue::text(STATUS_DONE))
            .await?;
        self.records
            .write_field(index, &fields.url, FieldValue::text(&artifact.url))
            .await?;
        self.records
            .write_field(index, &fields.generated_at, FieldValue::text(generated_at))
            .await?;
        if self.config.clear_trigger_after_success {
            self.records
                .write_field(index, &fields.trigger, FieldValue::Bool(false))
                .await?;
        }
        Ok(())
    }

    async fn write_failure(&self, index: usize, err: &DocflowError) {
        let status = FieldValue::text(err.status_text());
        if let Err(e) = self
            .records
            .write_field(index, &self.config.control_fields.status, status)
            .await
        {
            error!(row = index, error = %e, "Failed to record error status");
        }
    }

    async fn emit(&self, index: usize, outcome: &GenerationOutcome) {
        debug_assert!(outcome.state().is_terminal());
        let event_type = match outcome {
            GenerationOutcome::Created { .. } => events::RECORD_CREATED,
            GenerationOutcome::Skipped { .. } => events::RECORD_SKIPPED,
            GenerationOutcome::Failed { .. } => events::RECORD_FAILED,
        };
        let mut payload = outcome.to_json();
        payload["row"] = serde_json::json!(index);
        self.events.emit(event_type, Some(payload)).await;
    }
}

impl std::fmt::Debug for RecordProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordProcessor")
            .field("config", &self.config)
            .field("materializer", &self.materializer)
            .finish_non_exhaustive()
    }
}
