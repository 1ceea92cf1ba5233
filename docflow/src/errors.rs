//! Error types for the docflow materializer.
//!
//! Every failure that can happen while materializing a record is expressed
//! as a [`DocflowError`] carrying an [`ErrorKind`] and a message. Errors are
//! rendered to text only at the write-back boundary.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Classification of a materialization failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A template, output location, artifact or row is missing.
    NotFound,
    /// The artifact body is malformed or could not be written.
    SubstitutionFault,
    /// An external service was unavailable.
    Transient,
    /// The configuration is invalid.
    InvalidConfig,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::SubstitutionFault => write!(f, "substitution_fault"),
            Self::Transient => write!(f, "transient"),
            Self::InvalidConfig => write!(f, "invalid_config"),
        }
    }
}

/// The main error type for docflow operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DocflowError {
    /// A named resource does not exist.
    #[error("{what} not found: {id}")]
    NotFound {
        /// Resource type (e.g. "Template", "Output location").
        what: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// The body substitution or the artifact write failed.
    #[error("Substitution failed: {0}")]
    SubstitutionFault(String),

    /// An external service was unavailable.
    #[error("Service unavailable: {0}")]
    Transient(String),

    /// The configuration was rejected.
    #[error("{0}")]
    Config(#[from] ConfigError),
}

impl DocflowError {
    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(what: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            what: what.into(),
            id: id.into(),
        }
    }

    /// Creates a substitution fault.
    #[must_use]
    pub fn substitution(message: impl Into<String>) -> Self {
        Self::SubstitutionFault(message.into())
    }

    /// Creates a transient error.
    #[must_use]
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient(message.into())
    }

    /// Returns the kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::SubstitutionFault(_) => ErrorKind::SubstitutionFault,
            Self::Transient(_) => ErrorKind::Transient,
            Self::Config(_) => ErrorKind::InvalidConfig,
        }
    }

    /// Renders the text written into a record's status field.
    #[must_use]
    pub fn status_text(&self) -> String {
        format!("Error: {self}")
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("kind".to_string(), serde_json::json!(self.kind()));
        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map
    }
}

impl From<std::io::Error> for DocflowError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::not_found("File", err.to_string()),
            std::io::ErrorKind::Interrupted
            | std::io::ErrorKind::TimedOut
            | std::io::ErrorKind::WouldBlock => Self::transient(err.to_string()),
            _ => Self::substitution(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for DocflowError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(ConfigError::Parse(err.to_string()))
    }
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required option was empty.
    #[error("Missing configuration option: {0}")]
    Missing(&'static str),

    /// Two control fields share the same name.
    #[error("Control field '{0}' is configured more than once")]
    DuplicateControlField(String),

    /// The reference offset is outside the valid range.
    #[error("UTC offset of {0} minutes is out of range")]
    InvalidOffset(i32),

    /// The configuration document could not be parsed.
    #[error("Invalid configuration: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            DocflowError::not_found("Template", "abc").kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            DocflowError::substitution("bad body").kind(),
            ErrorKind::SubstitutionFault
        );
        assert_eq!(DocflowError::transient("down").kind(), ErrorKind::Transient);
        assert_eq!(
            DocflowError::from(ConfigError::Missing("template_id")).kind(),
            ErrorKind::InvalidConfig
        );
    }

    #[test]
    fn test_status_text() {
        let err = DocflowError::not_found("Template", "tpl-1");
        assert_eq!(err.status_text(), "Error: Template not found: tpl-1");
    }

    #[test]
    fn test_io_error_conversion() {
        let err: DocflowError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err: DocflowError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert_eq!(err.kind(), ErrorKind::SubstitutionFault);

        let err: DocflowError =
            std::io::Error::new(std::io::ErrorKind::TimedOut, "slow").into();
        assert_eq!(err.kind(), ErrorKind::Transient);
    }

    #[test]
    fn test_error_to_dict() {
        let dict = DocflowError::transient("quota").to_dict();
        assert_eq!(dict.get("kind").unwrap(), "transient");
        assert_eq!(dict.get("message").unwrap(), "Service unavailable: quota");
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::NotFound.to_string(), "not_found");
        assert_eq!(ErrorKind::InvalidConfig.to_string(), "invalid_config");
    }
}
