//! Batch runs over every data row.

use std::sync::Arc;
use tracing::{info, instrument};

use crate::core::GenerationOutcome;
use crate::errors::DocflowError;
use crate::events;
use crate::processor::RecordProcessor;

/// Summary of one batch run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    /// Per-row outcomes in processing order.
    pub outcomes: Vec<(usize, GenerationOutcome)>,
    /// Rows that reached `Done`.
    pub created: usize,
    /// Rows rejected by a guard.
    pub skipped: usize,
    /// Rows whose generation failed.
    pub failed: usize,
}

impl BatchSummary {
    /// Records the outcome for one row.
    pub fn record(&mut self, row: usize, outcome: GenerationOutcome) {
        match &outcome {
            GenerationOutcome::Created { .. } => self.created += 1,
            GenerationOutcome::Skipped { .. } => self.skipped += 1,
            GenerationOutcome::Failed { .. } => self.failed += 1,
        }
        self.outcomes.push((row, outcome));
    }

    /// Returns the number of processed rows.
    #[must_use]
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Returns the outcome for a row, if it was processed.
    #[must_use]
    pub fn outcome(&self, row: usize) -> Option<&GenerationOutcome> {
        self.outcomes
            .iter()
            .find(|(r, _)| *r == row)
            .map(|(_, outcome)| outcome)
    }

    /// Returns the rows that failed.
    #[must_use]
    pub fn failed_rows(&self) -> Vec<usize> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_failed())
            .map(|(row, _)| *row)
            .collect()
    }

    /// Returns the counts as a JSON payload.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "total": self.total(),
            "created": self.created,
            "skipped": self.skipped,
            "failed": self.failed,
        })
    }
}

/// Runs the record processor over many rows, one at a time.
///
/// A failing row never aborts the run.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    processor: Arc<RecordProcessor>,
}

impl BatchRunner {
    /// Creates a runner around a processor.
    #[must_use]
    pub fn new(processor: Arc<RecordProcessor>) -> Self {
        Self { processor }
    }

    /// Returns the processor.
    #[must_use]
    pub fn processor(&self) -> &Arc<RecordProcessor> {
        &self.processor
    }

    /// Processes every data row in ascending order.
    ///
    /// Fails only if the row count cannot be read.
    #[instrument(skip(self))]
    pub async fn run_all(&self) -> Result<BatchSummary, DocflowError> {
        let count = self.processor.records().row_count().await?;
        info!(rows = count, "Starting batch run");
        Ok(self.run_rows(0..count).await)
    }

    /// Processes the given rows in the given order.
    pub async fn run_rows(&self, rows: impl IntoIterator<Item = usize>) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for row in rows {
            let outcome = self.processor.process(row).await;
            summary.record(row, outcome);
        }

        info!(
            total = summary.total(),
            created = summary.created,
            skipped = summary.skipped,
            failed = summary.failed,
            "Batch run completed"
        );
        self.processor
            .events()
            .emit(events::BATCH_COMPLETED, Some(summary.to_json()))
            .await;
        summary
    }
}
