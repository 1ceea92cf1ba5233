//! Core data types: field values, records, states and outcomes.

mod outcome;
mod record;
mod status;
mod value;

pub use outcome::{ArtifactRef, GenerationOutcome, SkipReason};
pub use record::Record;
pub use status::RecordState;
pub use value::FieldValue;
