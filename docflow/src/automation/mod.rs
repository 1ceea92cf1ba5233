//! Entry points: edit, form-submit and manual triggers.
//!
//! [`Automation`] wires a [`GenerationConfig`] and the host's collaborators
//! into a [`RecordProcessor`] and a [`BatchRunner`], then routes trigger
//! events to the matching one.

#[cfg(test)]
mod integration_tests;

use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use crate::batch::{BatchRunner, BatchSummary};
use crate::config::GenerationConfig;
use crate::core::GenerationOutcome;
use crate::errors::{ConfigError, DocflowError};
use crate::events::{EventSink, LoggingEventSink, RecordStoreEventSink};
use crate::materializer::DocumentMaterializer;
use crate::processor::{RecordLocks, RecordProcessor, TriggerCheck};
use crate::stores::{ArtifactStore, RecordStore, TemplateStore};
use crate::template::TemplateEngine;
use crate::utils::timestamps::{Clock, SystemClock};

/// A host event that may start generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerEvent {
    /// A field of a data row was edited.
    Edit {
        /// Data row index.
        row: usize,
        /// Name of the edited field.
        field: String,
    },
    /// A form submission appended or updated a data row.
    FormSubmit {
        /// Data row index.
        row: usize,
    },
    /// An operator requested a run over all rows.
    Manual,
}

/// Why a trigger event did not start any processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The edited field is not the trigger field.
    UnwatchedField(String),
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnwatchedField(field) => write!(f, "field '{field}' is not watched"),
        }
    }
}

/// The result of handling one trigger event.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerResult {
    /// One row was processed.
    Single(usize, GenerationOutcome),
    /// A batch run was executed.
    Batch(BatchSummary),
    /// Nothing was processed.
    Ignored(IgnoreReason),
}

/// Routes trigger events to the processor or the batch runner.
#[derive(Debug, Clone)]
pub struct Automation {
    processor: Arc<RecordProcessor>,
    batch: BatchRunner,
}

impl Automation {
    /// Starts building an automation from a configuration and collaborators.
    #[must_use]
    pub fn builder(
        config: GenerationConfig,
        records: Arc<dyn RecordStore>,
        templates: Arc<dyn TemplateStore>,
        artifacts: Arc<dyn ArtifactStore>,
    ) -> AutomationBuilder {
        AutomationBuilder {
            config,
            records,
            templates,
            artifacts,
            engine: TemplateEngine::default(),
            clock: None,
            events: None,
            log_store: None,
            locks: None,
        }
    }

    /// Returns the record processor.
    #[must_use]
    pub fn processor(&self) -> &Arc<RecordProcessor> {
        &self.processor
    }

    /// Returns the batch runner.
    #[must_use]
    pub fn batch(&self) -> &BatchRunner {
        &self.batch
    }

    /// Handles one trigger event.
    ///
    /// # Errors
    ///
    /// Only a manual run can fail, when the row count cannot be read.
    pub async fn handle(&self, event: TriggerEvent) -> Result<TriggerResult, DocflowError> {
        let config = self.processor.config();
        match event {
            TriggerEvent::Edit { row, field } => {
                if field.trim() != config.control_fields.trigger.trim() {
                    debug!(row, field = %field, "Ignoring edit of unwatched field");
                    return Ok(TriggerResult::Ignored(IgnoreReason::UnwatchedField(field)));
                }
                let outcome = self.processor.process(row).await;
                Ok(TriggerResult::Single(row, outcome))
            }
            TriggerEvent::FormSubmit { row } => {
                let check = if config.form_submit_requires_trigger {
                    TriggerCheck::Required
                } else {
                    TriggerCheck::Implicit
                };
                let outcome = self.processor.process_with(row, check).await;
                Ok(TriggerResult::Single(row, outcome))
            }
            TriggerEvent::Manual => {
                info!("Manual generation run requested");
                Ok(TriggerResult::Batch(self.batch.run_all().await?))
            }
        }
    }
}

/// Builder for [`Automation`].
pub struct AutomationBuilder {
    config: GenerationConfig,
    records: Arc<dyn RecordStore>,
    templates: Arc<dyn TemplateStore>,
    artifacts: Arc<dyn ArtifactStore>,
    engine: TemplateEngine,
    clock: Option<Arc<dyn Clock>>,
    events: Option<Arc<dyn EventSink>>,
    log_store: Option<Arc<dyn RecordStore>>,
    locks: Option<Arc<RecordLocks>>,
}

impl AutomationBuilder {
    /// Uses a specific template engine.
    #[must_use]
    pub fn with_engine(mut self, engine: TemplateEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Uses a specific clock instead of the system clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Sends events to a specific sink.
    #[must_use]
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = Some(events);
        self
    }

    /// Appends events as rows to `store`.
    ///
    /// The host passes the store it resolved from the configured log sink
    /// identifier. Ignored if an explicit event sink is set.
    #[must_use]
    pub fn with_log_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.log_store = Some(store);
        self
    }

    /// Shares in-flight locks with other automations on the same records.
    #[must_use]
    pub fn with_locks(mut self, locks: Arc<RecordLocks>) -> Self {
        self.locks = Some(locks);
        self
    }

    /// Validates the configuration and builds the automation.
    ///
    /// # Errors
    ///
    /// Returns [`DocflowError::Config`] if the configuration is invalid.
    pub fn build(self) -> Result<Automation, DocflowError> {
        self.config.validate()?;

        let clock: Arc<dyn Clock> = match self.clock {
            Some(clock) => clock,
            None => Arc::new(
                SystemClock::from_offset_minutes(self.config.utc_offset_minutes)
                    .ok_or(ConfigError::InvalidOffset(self.config.utc_offset_minutes))?,
            ),
        };

        let events: Arc<dyn EventSink> = match (self.events, self.log_store) {
            (Some(events), _) => events,
            (None, Some(store)) => Arc::new(RecordStoreEventSink::new(store, clock.clone())),
            (None, None) => Arc::new(LoggingEventSink::default()),
        };

        let materializer = DocumentMaterializer::new(
            self.engine,
            self.templates,
            self.artifacts,
            self.config.output_location_id.clone(),
        );

        let mut processor = RecordProcessor::new(self.config, self.records, materializer, clock)
            .with_event_sink(events);
        if let Some(locks) = self.locks {
            processor = processor.with_locks(locks);
        }

        let processor = Arc::new(processor);
        info!(
            template_id = %processor.config().template_id,
            location = %processor.config().output_location_id,
            "Automation ready"
        );
        Ok(Automation {
            batch: BatchRunner::new(processor.clone()),
            processor,
        })
    }
}

impl fmt::Debug for AutomationBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutomationBuilder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
