//! Per-record processing states.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::SkipReason;

/// The state of one record within one processing attempt.
///
/// `Pending → Skipped(_) | Materializing → Done | Failed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordState {
    /// The record has been read but not evaluated.
    #[default]
    Pending,
    /// A guard rejected the record.
    Skipped(SkipReason),
    /// The materializer is running.
    Materializing,
    /// The artifact was created and written back.
    Done,
    /// Materialization or write-back failed.
    Failed,
}

impl fmt::Display for RecordState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Skipped(_) => write!(f, "skipped"),
            Self::Materializing => write!(f, "materializing"),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl RecordState {
    /// Returns true if the state ends the attempt.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Skipped(_) | Self::Done | Self::Failed)
    }
}
