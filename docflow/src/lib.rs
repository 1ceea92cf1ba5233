//! # Docflow
//!
//! Turns tabular records into documents by filling a template's
//! `{{ placeholder }}` tokens with each record's field values.
//!
//! Docflow provides:
//!
//! - **Interpolation**: typed value formatting and `{{ key }}` substitution
//! - **Materialization**: copy a template, name it, fill its body, persist it
//! - **Idempotent processing**: per-record guards, write-back of status, URL
//!   and timestamp, with failures contained to the record
//! - **Batch runs**: ascending-order runs that never abort on one record
//! - **Triggers**: edit, form-submit and manual entry points
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docflow::prelude::*;
//!
//! let config = GenerationConfig::new("offer-template", "generated");
//! let automation = Automation::builder(config, records, templates, artifacts).build()?;
//!
//! // A user ticked the trigger checkbox on row 3
//! let result = automation
//!     .handle(TriggerEvent::Edit { row: 3, field: "Generate".into() })
//!     .await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod automation;
pub mod batch;
pub mod config;
pub mod core;
pub mod errors;
pub mod events;
pub mod format;
pub mod materializer;
pub mod observability;
pub mod processor;
pub mod stores;
pub mod template;
pub mod testing;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::automation::{Automation, TriggerEvent, TriggerResult};
    pub use crate::batch::{BatchRunner, BatchSummary};
    pub use crate::config::{ControlFields, GenerationConfig};
    pub use crate::core::{ArtifactRef, FieldValue, GenerationOutcome, Record, SkipReason};
    pub use crate::errors::{ConfigError, DocflowError, ErrorKind};
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink, RecordStoreEventSink};
    pub use crate::format::ValueFormatter;
    pub use crate::materializer::DocumentMaterializer;
    pub use crate::processor::{RecordProcessor, TriggerCheck};
    pub use crate::stores::{ArtifactStore, RecordStore, Template, TemplateStore};
    pub use crate::template::{DocumentBody, TemplateEngine};
    pub use crate::utils::{Clock, SystemClock};
}
