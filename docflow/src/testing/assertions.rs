//! Test assertions for generation outcomes.

use crate::core::{GenerationOutcome, SkipReason};
use crate::errors::ErrorKind;

/// Asserts that the outcome created an artifact.
pub fn assert_created(outcome: &GenerationOutcome) {
    assert!(
        outcome.is_created(),
        "Expected created, got: {:?}",
        outcome
    );
}

/// Asserts that the outcome was skipped for `reason`.
pub fn assert_skipped(outcome: &GenerationOutcome, reason: SkipReason) {
    assert_eq!(
        outcome,
        &GenerationOutcome::Skipped { reason },
        "Expected skip for {:?}, got {:?}",
        reason,
        outcome
    );
}

/// Asserts that the outcome failed with an error of `kind`.
pub fn assert_failed(outcome: &GenerationOutcome, kind: ErrorKind) {
    match outcome {
        GenerationOutcome::Failed { error } => assert_eq!(
            error.kind(),
            kind,
            "Expected failure of kind {:?}, got {:?}",
            kind,
            error
        ),
        other => panic!("Expected failure of kind {kind:?}, got {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ArtifactRef;
    use crate::errors::DocflowError;

    #[test]
    fn test_assert_created() {
        let outcome = GenerationOutcome::Created {
            artifact: ArtifactRef {
                id: "1".to_string(),
                url: "u".to_string(),
                name: "n".to_string(),
            },
        };
        assert_created(&outcome);
    }

    #[test]
    #[should_panic(expected = "Expected created")]
    fn test_assert_created_fails() {
        assert_created(&GenerationOutcome::skipped(SkipReason::NotTriggered));
    }

    #[test]
    fn test_assert_skipped() {
        assert_skipped(
            &GenerationOutcome::skipped(SkipReason::UrlExists),
            SkipReason::UrlExists,
        );
    }

    #[test]
    #[should_panic(expected = "Expected failure of kind")]
    fn test_assert_failed_wrong_kind() {
        assert_failed(
            &GenerationOutcome::failed(DocflowError::transient("x")),
            ErrorKind::NotFound,
        );
    }
}
