//! Testing utilities for docflow.
//!
//! This module provides:
//! - Fault-injecting store wrappers
//! - Record and template fixtures
//! - Assertions for generation outcomes

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{assert_created, assert_failed, assert_skipped};
pub use fixtures::{offer_template, project_record, project_store, OUTPUT_LOCATION, TEMPLATE_ID};
pub use mocks::{FailingArtifactStore, FailingRecordStore, FailurePoint};
