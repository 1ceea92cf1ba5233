//! Filesystem-backed template and artifact stores.
//!
//! Templates are text files below a root directory. Output locations are
//! existing sub-directories of an output root; each artifact is a text file
//! inside its location.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::{ArtifactHandle, ArtifactStore, Template, TemplateStore};
use crate::errors::DocflowError;
use crate::template::DocumentBody;

/// Resolves `relative` below `root`, rejecting absolute paths and `..`.
fn resolve_within(root: &Path, relative: &str) -> Option<PathBuf> {
    let candidate = Path::new(relative);
    if relative.trim().is_empty()
        || candidate
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }
    Some(root.join(candidate))
}

/// Replaces characters that are not valid in file names.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim().trim_matches('.');
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Template store reading text files below a directory.
#[derive(Debug, Clone)]
pub struct FsTemplateStore {
    root: PathBuf,
}

impl FsTemplateStore {
    /// Creates a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl TemplateStore for FsTemplateStore {
    async fn open(&self, template_id: &str) -> Result<Template, DocflowError> {
        let path = resolve_within(&self.root, template_id)
            .ok_or_else(|| DocflowError::not_found("Template", template_id))?;

        let body = match tokio::fs::read_to_string(&path).await {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DocflowError::not_found("Template", template_id));
            }
            Err(e) => return Err(e.into()),
        };

        let name = path
            .file_name()
            .map_or_else(|| template_id.to_string(), |n| n.to_string_lossy().into_owned());
        debug!(template_id, path = %path.display(), "Opened template");
        Ok(Template::new(template_id, name, body))
    }
}

/// Artifact store writing text files below an output root.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    /// Creates a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn artifact_path(&self, artifact: &ArtifactHandle) -> Result<PathBuf, DocflowError> {
        resolve_within(&self.root, &artifact.id)
            .ok_or_else(|| DocflowError::not_found("Artifact", &artifact.id))
    }

    /// Creates a new file in `dir` holding `body`, suffixing ` (n)` until
    /// the name is free. Creation is exclusive, so concurrent copies under
    /// the same name never share a file.
    async fn create_unique(
        dir: &Path,
        stem: &str,
        ext: Option<&str>,
        body: &str,
    ) -> Result<String, DocflowError> {
        let file_name = |n: usize| {
            let stem = if n == 1 {
                stem.to_string()
            } else {
                format!("{stem} ({n})")
            };
            match ext {
                Some(ext) => format!("{stem}.{ext}"),
                None => stem,
            }
        };

        let mut n = 1;
        loop {
            let candidate = file_name(n);
            let opened = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(dir.join(&candidate))
                .await;
            match opened {
                Ok(mut file) => {
                    file.write_all(body.as_bytes()).await?;
                    file.flush().await?;
                    return Ok(candidate);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => n += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn copy(
        &self,
        template: &Template,
        name: &str,
        location: &str,
    ) -> Result<ArtifactHandle, DocflowError> {
        let dir = resolve_within(&self.root, location)
            .ok_or_else(|| DocflowError::not_found("Output location", location))?;
        if !tokio::fs::metadata(&dir).await.map(|m| m.is_dir()).unwrap_or(false) {
            return Err(DocflowError::not_found("Output location", location));
        }

        let ext = Path::new(&template.name)
            .extension()
            .map(|e| e.to_string_lossy().into_owned());
        let file_name = Self::create_unique(
            &dir,
            &sanitize_file_name(name),
            ext.as_deref(),
            &template.body,
        )
        .await?;

        debug!(location, file = %file_name, "Copied template");
        Ok(ArtifactHandle {
            id: format!("{location}/{file_name}"),
            name: name.to_string(),
            location: location.to_string(),
        })
    }

    async fn open_body(&self, artifact: &ArtifactHandle) -> Result<DocumentBody, DocflowError> {
        let path = self.artifact_path(artifact)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(DocumentBody::new(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(DocflowError::not_found("Artifact", &artifact.id))
            }
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => Err(
                DocflowError::substitution(format!("artifact '{}' is not text", artifact.id)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    async fn finalize(
        &self,
        artifact: &ArtifactHandle,
        body: DocumentBody,
    ) -> Result<(), DocflowError> {
        let path = self.artifact_path(artifact)?;
        tokio::fs::write(&path, body.into_text()).await?;
        Ok(())
    }

    async fn url(&self, artifact: &ArtifactHandle) -> Result<String, DocflowError> {
        let path = self.artifact_path(artifact)?;
        let absolute = tokio::fs::canonicalize(&path).await?;
        Ok(format!("file://{}", absolute.display()))
    }
}
