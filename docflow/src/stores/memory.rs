//! In-memory collaborators.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{ArtifactHandle, ArtifactStore, RecordStore, Template, TemplateStore};
use crate::core::{FieldValue, Record};
use crate::errors::DocflowError;
use crate::template::DocumentBody;

#[derive(Debug, Default)]
struct Sheet {
    headers: Vec<String>,
    rows: Vec<Vec<FieldValue>>,
}

impl Sheet {
    fn column_of(&self, field: &str) -> Option<usize> {
        let field = field.trim();
        self.headers.iter().position(|h| h.trim() == field)
    }

    fn ensure_column(&mut self, field: &str) -> usize {
        self.column_of(field).unwrap_or_else(|| {
            self.headers.push(field.trim().to_string());
            self.headers.len() - 1
        })
    }
}

/// A record store holding a header row and data rows in memory.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    sheet: RwLock<Sheet>,
    writes: AtomicUsize,
}

impl InMemoryRecordStore {
    /// Creates an empty store with the given header row.
    #[must_use]
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            sheet: RwLock::new(Sheet {
                headers,
                rows: Vec::new(),
            }),
            writes: AtomicUsize::new(0),
        }
    }

    /// Creates a store from records, using the union of their fields as headers.
    #[must_use]
    pub fn from_records(records: &[Record]) -> Self {
        let mut sheet = Sheet::default();
        for record in records {
            let mut row = Vec::new();
            for (name, value) in record.iter() {
                let col = sheet.ensure_column(name);
                if row.len() <= col {
                    row.resize(col + 1, FieldValue::Empty);
                }
                row[col] = value.clone();
            }
            sheet.rows.push(row);
        }
        Self {
            sheet: RwLock::new(sheet),
            writes: AtomicUsize::new(0),
        }
    }

    /// Returns the number of field writes performed.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Returns the current header row.
    #[must_use]
    pub fn headers(&self) -> Vec<String> {
        self.sheet.read().headers.clone()
    }

    /// Returns a snapshot of a row without going through the async API.
    #[must_use]
    pub fn snapshot(&self, index: usize) -> Option<Record> {
        let sheet = self.sheet.read();
        sheet
            .rows
            .get(index)
            .map(|row| Record::from_row(&sheet.headers, row.clone()))
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn read_headers(&self) -> Result<Vec<String>, DocflowError> {
        Ok(self.headers())
    }

    async fn read_row(&self, index: usize) -> Result<Record, DocflowError> {
        self.snapshot(index)
            .ok_or_else(|| DocflowError::not_found("Row", index.to_string()))
    }

    async fn write_field(
        &self,
        index: usize,
        field: &str,
        value: FieldValue,
    ) -> Result<(), DocflowError> {
        let mut sheet = self.sheet.write();
        if index >= sheet.rows.len() {
            return Err(DocflowError::not_found("Row", index.to_string()));
        }
        let col = sheet.ensure_column(field);
        let row = &mut sheet.rows[index];
        if row.len() <= col {
            row.resize(col + 1, FieldValue::Empty);
        }
        row[col] = value;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn append_row(&self, record: &Record) -> Result<usize, DocflowError> {
        let mut sheet = self.sheet.write();
        let mut row = vec![FieldValue::Empty; sheet.headers.len()];
        for (name, value) in record.iter() {
            let col = sheet.ensure_column(name);
            if row.len() <= col {
                row.resize(col + 1, FieldValue::Empty);
            }
            row[col] = value.clone();
        }
        sheet.rows.push(row);
        Ok(sheet.rows.len() - 1)
    }

    async fn row_count(&self) -> Result<usize, DocflowError> {
        Ok(self.sheet.read().rows.len())
    }
}

/// A template store backed by a map.
#[derive(Debug, Default)]
pub struct InMemoryTemplateStore {
    templates: RwLock<HashMap<String, Template>>,
}

impl InMemoryTemplateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a template, builder style.
    #[must_use]
    pub fn with_template(self, template: Template) -> Self {
        self.insert(template);
        self
    }

    /// Adds or replaces a template.
    pub fn insert(&self, template: Template) {
        self.templates.write().insert(template.id.clone(), template);
    }
}

#[async_trait]
impl TemplateStore for InMemoryTemplateStore {
    async fn open(&self, template_id: &str) -> Result<Template, DocflowError> {
        self.templates
            .read()
            .get(template_id)
            .cloned()
            .ok_or_else(|| DocflowError::not_found("Template", template_id))
    }
}

/// An artifact held by [`InMemoryArtifactStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArtifact {
    /// Artifact handle.
    pub handle: ArtifactHandle,
    /// Template the artifact was copied from.
    pub template_id: String,
    /// Current body text.
    pub body: String,
    /// Whether the artifact has been finalized.
    pub finalized: bool,
}

/// An artifact store keeping copies in memory.
#[derive(Debug, Default)]
pub struct InMemoryArtifactStore {
    locations: RwLock<HashSet<String>>,
    artifacts: RwLock<HashMap<String, StoredArtifact>>,
    writes: AtomicUsize,
}

impl InMemoryArtifactStore {
    /// Creates an empty store with no locations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a writable location, builder style.
    #[must_use]
    pub fn with_location(self, location: impl Into<String>) -> Self {
        self.locations.write().insert(location.into());
        self
    }

    /// Returns the number of write operations (copies and finalizations).
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Returns a stored artifact by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<StoredArtifact> {
        self.artifacts.read().get(id).cloned()
    }

    /// Returns all stored artifacts.
    #[must_use]
    pub fn artifacts(&self) -> Vec<StoredArtifact> {
        self.artifacts.read().values().cloned().collect()
    }

    /// Returns the number of stored artifacts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.artifacts.read().len()
    }

    /// Returns true if no artifact has been created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artifacts.read().is_empty()
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn copy(
        &self,
        template: &Template,
        name: &str,
        location: &str,
    ) -> Result<ArtifactHandle, DocflowError> {
        if !self.locations.read().contains(location) {
            return Err(DocflowError::not_found("Output location", location));
        }

        let handle = ArtifactHandle {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            location: location.to_string(),
        };
        self.artifacts.write().insert(
            handle.id.clone(),
            StoredArtifact {
                handle: handle.clone(),
                template_id: template.id.clone(),
                body: template.body.clone(),
                finalized: false,
            },
        );
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(handle)
    }

    async fn open_body(&self, artifact: &ArtifactHandle) -> Result<DocumentBody, DocflowError> {
        self.artifacts
            .read()
            .get(&artifact.id)
            .map(|stored| DocumentBody::new(stored.body.clone()))
            .ok_or_else(|| DocflowError::not_found("Artifact", &artifact.id))
    }

    async fn finalize(
        &self,
        artifact: &ArtifactHandle,
        body: DocumentBody,
    ) -> Result<(), DocflowError> {
        let mut artifacts = self.artifacts.write();
        let stored = artifacts
            .get_mut(&artifact.id)
            .ok_or_else(|| DocflowError::not_found("Artifact", &artifact.id))?;
        stored.body = body.into_text();
        stored.finalized = true;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn url(&self, artifact: &ArtifactHandle) -> Result<String, DocflowError> {
        if self.artifacts.read().contains_key(&artifact.id) {
            Ok(format!("memory://{}/{}", artifact.location, artifact.id))
        } else {
            Err(DocflowError::not_found("Artifact", &artifact.id))
        }
    }
}
