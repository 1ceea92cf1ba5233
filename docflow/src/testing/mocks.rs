//! Fault-injecting collaborators.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::core::{FieldValue, Record};
use crate::errors::DocflowError;
use crate::stores::{ArtifactHandle, ArtifactStore, RecordStore, Template};
use crate::template::DocumentBody;

/// Step of the artifact lifecycle at which a failure is injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    /// Fail when copying the template.
    Copy,
    /// Fail when opening the copy's body.
    OpenBody,
    /// Fail when persisting the body.
    Finalize,
    /// Fail when resolving the URL.
    Url,
}

/// Artifact store wrapper that fails at a chosen step.
///
/// With [`Self::when_name_contains`] only artifacts whose name contains the
/// given text fail; all others pass through to the inner store.
pub struct FailingArtifactStore {
    inner: Arc<dyn ArtifactStore>,
    point: FailurePoint,
    name_filter: Option<String>,
    failures: AtomicUsize,
}

impl FailingArtifactStore {
    /// Creates a wrapper failing every artifact at `point`.
    #[must_use]
    pub fn new(inner: Arc<dyn ArtifactStore>, point: FailurePoint) -> Self {
        Self {
            inner,
            point,
            name_filter: None,
            failures: AtomicUsize::new(0),
        }
    }

    /// Restricts failures to artifacts whose name contains `text`.
    #[must_use]
    pub fn when_name_contains(mut self, text: impl Into<String>) -> Self {
        self.name_filter = Some(text.into());
        self
    }

    /// Returns the number of injected failures.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }

    fn check(&self, point: FailurePoint, name: &str) -> Result<(), DocflowError> {
        let matches_name = self
            .name_filter
            .as_ref()
            .map_or(true, |filter| name.contains(filter.as_str()));
        if point == self.point && matches_name {
            self.failures.fetch_add(1, Ordering::SeqCst);
            return Err(match point {
                FailurePoint::Copy => DocflowError::transient("artifact service unavailable"),
                FailurePoint::OpenBody => DocflowError::substitution("malformed document body"),
                FailurePoint::Finalize => DocflowError::substitution("document write failed"),
                FailurePoint::Url => DocflowError::transient("url lookup failed"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ArtifactStore for FailingArtifactStore {
    async fn copy(
        &self,
        template: &Template,
        name: &str,
        location: &str,
    ) -> Result<ArtifactHandle, DocflowError> {
        self.check(FailurePoint::Copy, name)?;
        self.inner.copy(template, name, location).await
    }

    async fn open_body(&self, artifact: &ArtifactHandle) -> Result<DocumentBody, DocflowError> {
        self.check(FailurePoint::OpenBody, &artifact.name)?;
        self.inner.open_body(artifact).await
    }

    async fn finalize(
        &self,
        artifact: &ArtifactHandle,
        body: DocumentBody,
    ) -> Result<(), DocflowError> {
        self.check(FailurePoint::Finalize, &artifact.name)?;
        self.inner.finalize(artifact, body).await
    }

    async fn url(&self, artifact: &ArtifactHandle) -> Result<String, DocflowError> {
        self.check(FailurePoint::Url, &artifact.name)?;
        self.inner.url(artifact).await
    }
}

/// Record store wrapper whose reads or writes fail.
pub struct FailingRecordStore {
    inner: Arc<dyn RecordStore>,
    fail_reads: bool,
    fail_writes: bool,
}

impl FailingRecordStore {
    /// Creates a wrapper failing row reads.
    #[must_use]
    pub fn failing_reads(inner: Arc<dyn RecordStore>) -> Self {
        Self {
            inner,
            fail_reads: true,
            fail_writes: false,
        }
    }

    /// Creates a wrapper failing field writes.
    #[must_use]
    pub fn failing_writes(inner: Arc<dyn RecordStore>) -> Self {
        Self {
            inner,
            fail_reads: false,
            fail_writes: true,
        }
    }
}

#[async_trait]
impl RecordStore for FailingRecordStore {
    async fn read_headers(&self) -> Result<Vec<String>, DocflowError> {
        self.inner.read_headers().await
    }

    async fn read_row(&self, index: usize) -> Result<Record, DocflowError> {
        if self.fail_reads {
            return Err(DocflowError::transient("record service unavailable"));
        }
        self.inner.read_row(index).await
    }

    async fn write_field(
        &self,
        index: usize,
        field: &str,
        value: FieldValue,
    ) -> Result<(), DocflowError> {
        if self.fail_writes {
            return Err(DocflowError::transient("record service unavailable"));
        }
        self.inner.write_field(index, field, value).await
    }

    async fn append_row(&self, record: &Record) -> Result<usize, DocflowError> {
        self.inner.append_row(record).await
    }

    async fn row_count(&self) -> Result<usize, DocflowError> {
        self.inner.row_count().await
    }
}
