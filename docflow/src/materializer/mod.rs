//! Document materialization: template copy, naming and body substitution.

use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::core::{ArtifactRef, Record};
use crate::errors::DocflowError;
use crate::stores::{ArtifactStore, TemplateStore};
use crate::template::TemplateEngine;

/// Produces artifacts from a template and a record.
///
/// Failures are returned as a single [`DocflowError`]. There is no rollback:
/// if substitution or finalization fails, the copied artifact stays in the
/// output location.
pub struct DocumentMaterializer {
    engine: TemplateEngine,
    templates: Arc<dyn TemplateStore>,
    artifacts: Arc<dyn ArtifactStore>,
    output_location: String,
}

impl DocumentMaterializer {
    /// Creates a materializer writing into `output_location`.
    #[must_use]
    pub fn new(
        engine: TemplateEngine,
        templates: Arc<dyn TemplateStore>,
        artifacts: Arc<dyn ArtifactStore>,
        output_location: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            templates,
            artifacts,
            output_location: output_location.into(),
        }
    }

    /// Returns the template engine.
    #[must_use]
    pub fn engine(&self) -> &TemplateEngine {
        &self.engine
    }

    /// Materializes `record` from the template `template_id`.
    ///
    /// 1. interpolate the naming pattern into a file name
    /// 2. copy the template under that name
    /// 3. substitute every record field into the copy's body
    /// 4. finalize the copy
    #[instrument(skip(self, record), fields(location = %self.output_location))]
    pub async fn materialize(
        &self,
        template_id: &str,
        record: &Record,
        naming_pattern: &str,
    ) -> Result<ArtifactRef, DocflowError> {
        let name = self.engine.interpolate(naming_pattern, record);
        let absent: Vec<String> = self
            .engine
            .placeholders(naming_pattern)
            .into_iter()
            .filter(|key| !record.contains(key))
            .collect();
        if !absent.is_empty() {
            warn!(?absent, name = %name, "Naming pattern references absent fields");
        }

        let template = self.templates.open(template_id).await?;
        let handle = self
            .artifacts
            .copy(&template, &name, &self.output_location)
            .await?;
        debug!(artifact_id = %handle.id, name = %name, "Copied template");

        let mut body = self.artifacts.open_body(&handle).await?;
        let replaced = self.engine.substitute_body(&mut body, record)?;
        self.artifacts.finalize(&handle, body).await?;
        debug!(artifact_id = %handle.id, replaced, "Finalized artifact");

        let url = self.artifacts.url(&handle).await?;
        Ok(ArtifactRef {
            id: handle.id,
            url,
            name,
        })
    }
}

impl std::fmt::Debug for DocumentMaterializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentMaterializer")
            .field("output_location", &self.output_location)
            .finish_non_exhaustive()
    }
}
