//! Generation outcomes produced by the record processor.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::RecordState;
use crate::errors::DocflowError;

/// Reference to a materialized artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    /// Artifact identifier in the artifact store.
    pub id: String,
    /// Shareable URL of the artifact.
    pub url: String,
    /// Display name computed from the naming pattern.
    pub name: String,
}

/// Why a record was not materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The record already carries an artifact URL.
    UrlExists,
    /// The trigger field is not set.
    NotTriggered,
    /// Another attempt on the same record is running.
    InProgress,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UrlExists => write!(f, "url_exists"),
            Self::NotTriggered => write!(f, "not_triggered"),
            Self::InProgress => write!(f, "in_progress"),
        }
    }
}

/// The result of evaluating one record for one trigger.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    /// A new artifact was created and written back.
    Created {
        /// The created artifact.
        artifact: ArtifactRef,
    },
    /// The record was not eligible.
    Skipped {
        /// Why it was skipped.
        reason: SkipReason,
    },
    /// Materialization or write-back failed.
    Failed {
        /// The contained error.
        error: DocflowError,
    },
}

impl GenerationOutcome {
    /// Creates a skipped outcome.
    #[must_use]
    pub fn skipped(reason: SkipReason) -> Self {
        Self::Skipped { reason }
    }

    /// Creates a failed outcome.
    #[must_use]
    pub fn failed(error: DocflowError) -> Self {
        Self::Failed { error }
    }

    /// Returns the terminal state this outcome represents.
    #[must_use]
    pub fn state(&self) -> RecordState {
        match self {
            Self::Created { .. } => RecordState::Done,
            Self::Skipped { reason } => RecordState::Skipped(*reason),
            Self::Failed { .. } => RecordState::Failed,
        }
    }

    /// Returns true if an artifact was created.
    #[must_use]
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created { .. })
    }

    /// Returns true if the record was skipped.
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    /// Returns true if generation failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Returns the created artifact, if any.
    #[must_use]
    pub fn artifact(&self) -> Option<&ArtifactRef> {
        match self {
            Self::Created { artifact } => Some(artifact),
            _ => None,
        }
    }

    /// Converts to a JSON payload for event sinks.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Created { artifact } => serde_json::json!({
                "state": self.state().to_string(),
                "artifact_id": artifact.id,
                "url": artifact.url,
                "name": artifact.name,
            }),
            Self::Skipped { reason } => serde_json::json!({
                "state": self.state().to_string(),
                "reason": reason.to_string(),
            }),
            Self::Failed { error } => serde_json::json!({
                "state": self.state().to_string(),
                "kind": error.kind(),
                "error": error.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact() -> ArtifactRef {
        ArtifactRef {
            id: "a-1".to_string(),
            url: "memory://out/a-1".to_string(),
            name: "Acme".to_string(),
        }
    }

    #[test]
    fn test_outcome_states() {
        let created = GenerationOutcome::Created { artifact: artifact() };
        assert!(created.is_created());
        assert_eq!(created.state(), RecordState::Done);
        assert_eq!(created.artifact().unwrap().id, "a-1");

        let skipped = GenerationOutcome::skipped(SkipReason::UrlExists);
        assert!(skipped.is_skipped());
        assert_eq!(skipped.state(), RecordState::Skipped(SkipReason::UrlExists));
        assert!(skipped.artifact().is_none());

        let failed = GenerationOutcome::failed(DocflowError::transient("down"));
        assert!(failed.is_failed());
        assert_eq!(failed.state(), RecordState::Failed);
    }

    #[test]
    fn test_outcome_to_json() {
        let json = GenerationOutcome::skipped(SkipReason::NotTriggered).to_json();
        assert_eq!(json["state"], "skipped");
        assert_eq!(json["reason"], "not_triggered");

        let json = GenerationOutcome::failed(DocflowError::not_found("Template", "t")).to_json();
        assert_eq!(json["kind"], "not_found");
        assert_eq!(json["error"], "Template not found: t");
    }

    #[test]
    fn test_skip_reason_serialize() {
        let json = serde_json::to_string(&SkipReason::InProgress).unwrap();
        assert_eq!(json, r#""in_progress""#);
    }
}
