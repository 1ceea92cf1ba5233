//! Collaborator interfaces to the hosting platform.
//!
//! The materializer never talks to a spreadsheet or document service
//! directly. Hosts implement these traits; in-memory and filesystem
//! implementations are provided for tests and local use.

mod fs;
mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{FieldValue, Record};
use crate::errors::DocflowError;
use crate::template::DocumentBody;

pub use fs::{FsArtifactStore, FsTemplateStore};
pub use memory::{InMemoryArtifactStore, InMemoryRecordStore, InMemoryTemplateStore, StoredArtifact};

/// A readable template artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// Opaque template identifier.
    pub id: String,
    /// Display name of the template.
    pub name: String,
    /// Body text containing placeholder tokens.
    pub body: String,
}

impl Template {
    /// Creates a new template.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            body: body.into(),
        }
    }
}

/// Handle to an artifact copied from a template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactHandle {
    /// Artifact identifier.
    pub id: String,
    /// Artifact display name.
    pub name: String,
    /// Location the artifact was copied into.
    pub location: String,
}

/// Row-oriented data source with write-back.
///
/// Row indices are zero-based and exclude the header row.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Reads the header row.
    async fn read_headers(&self) -> Result<Vec<String>, DocflowError>;

    /// Reads one data row as a record.
    async fn read_row(&self, index: usize) -> Result<Record, DocflowError>;

    /// Writes one field of a row, appending the field if it is unknown.
    async fn write_field(
        &self,
        index: usize,
        field: &str,
        value: FieldValue,
    ) -> Result<(), DocflowError>;

    /// Appends a row and returns its index.
    ///
    /// Fields unknown to the header row are appended as new columns.
    async fn append_row(&self, record: &Record) -> Result<usize, DocflowError>;

    /// Returns the number of data rows.
    async fn row_count(&self) -> Result<usize, DocflowError>;
}

/// Source of templates.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Opens a template by identifier.
    async fn open(&self, template_id: &str) -> Result<Template, DocflowError>;
}

/// Destination for generated artifacts.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Copies a template under a new name into a location.
    async fn copy(
        &self,
        template: &Template,
        name: &str,
        location: &str,
    ) -> Result<ArtifactHandle, DocflowError>;

    /// Opens the editable body of an artifact.
    async fn open_body(&self, artifact: &ArtifactHandle) -> Result<DocumentBody, DocflowError>;

    /// Persists an edited body.
    async fn finalize(
        &self,
        artifact: &ArtifactHandle,
        body: DocumentBody,
    ) -> Result<(), DocflowError>;

    /// Returns the shareable URL of an artifact.
    async fn url(&self, artifact: &ArtifactHandle) -> Result<String, DocflowError>;
}
