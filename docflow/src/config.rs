//! Configuration for document generation.
//!
//! All options are carried in an explicit [`GenerationConfig`] value handed
//! to each component's constructor.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::errors::{ConfigError, DocflowError};
use crate::utils::timestamps::offset_from_minutes;

/// Names of the fields driving the per-record state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlFields {
    /// Field holding the generation request flag.
    #[serde(default = "default_trigger_field")]
    pub trigger: String,
    /// Field receiving `Done` or `Error: …`.
    #[serde(default = "default_status_field")]
    pub status: String,
    /// Field receiving the artifact URL; doubles as the idempotency guard.
    #[serde(default = "default_url_field")]
    pub url: String,
    /// Field receiving the generation timestamp.
    #[serde(default = "default_generated_at_field")]
    pub generated_at: String,
}

fn default_trigger_field() -> String {
    "Generate".to_string()
}

fn default_status_field() -> String {
    "Status".to_string()
}

fn default_url_field() -> String {
    "Document URL".to_string()
}

fn default_generated_at_field() -> String {
    "Generated At".to_string()
}

impl Default for ControlFields {
    fn default() -> Self {
        Self {
            trigger: default_trigger_field(),
            status: default_status_field(),
            url: default_url_field(),
            generated_at: default_generated_at_field(),
        }
    }
}

impl ControlFields {
    /// Returns all four field names.
    #[must_use]
    pub fn names(&self) -> [&str; 4] {
        [
            self.trigger.as_str(),
            self.status.as_str(),
            self.url.as_str(),
            self.generated_at.as_str(),
        ]
    }

    /// Returns a copy with surrounding whitespace removed from every name.
    ///
    /// Records and stores trim field names, so lookups must use the
    /// trimmed form.
    #[must_use]
    pub fn trimmed(&self) -> Self {
        Self {
            trigger: self.trigger.trim().to_string(),
            status: self.status.trim().to_string(),
            url: self.url.trim().to_string(),
            generated_at: self.generated_at.trim().to_string(),
        }
    }

    /// Returns true if `field` is one of the control fields.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.names().contains(&field.trim())
    }
}

/// Options for one generation setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Identifier of the template to copy.
    pub template_id: String,
    /// Identifier of the location receiving artifacts.
    pub output_location_id: String,
    /// Control field names.
    #[serde(default)]
    pub control_fields: ControlFields,
    /// Pattern for artifact names.
    #[serde(default = "default_naming_pattern")]
    pub naming_pattern: String,
    /// Reset the trigger field to `false` after a successful generation.
    #[serde(default = "default_true")]
    pub clear_trigger_after_success: bool,
    /// Skip records whose URL field is already filled.
    #[serde(default = "default_true")]
    pub skip_if_url_exists: bool,
    /// Identifier of the log sink; resolved by the host.
    #[serde(default)]
    pub log_sink: Option<String>,
    /// Reference zone as minutes east of UTC.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    /// Require the trigger flag on form submissions too.
    #[serde(default = "default_true")]
    pub form_submit_requires_trigger: bool,
}

fn default_naming_pattern() -> String {
    "{{Project}} - {{Name}} - {{Date}}".to_string()
}

fn default_true() -> bool {
    true
}

impl GenerationConfig {
    /// Creates a configuration with default options.
    #[must_use]
    pub fn new(template_id: impl Into<String>, output_location_id: impl Into<String>) -> Self {
        Self {
            template_id: template_id.into(),
            output_location_id: output_location_id.into(),
            control_fields: ControlFields::default(),
            naming_pattern: default_naming_pattern(),
            clear_trigger_after_success: true,
            skip_if_url_exists: true,
            log_sink: None,
            utc_offset_minutes: 0,
            form_submit_requires_trigger: true,
        }
    }

    /// Parses a configuration from JSON and validates it.
    pub fn from_json_str(json: &str) -> Result<Self, DocflowError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a JSON file and validates it.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, DocflowError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            ConfigError::Parse(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    /// Sets the control field names.
    #[must_use]
    pub fn with_control_fields(mut self, fields: ControlFields) -> Self {
        self.control_fields = fields;
        self
    }

    /// Sets the naming pattern.
    #[must_use]
    pub fn with_naming_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.naming_pattern = pattern.into();
        self
    }

    /// Sets whether the trigger is cleared after success.
    #[must_use]
    pub fn with_clear_trigger(mut self, clear: bool) -> Self {
        self.clear_trigger_after_success = clear;
        self
    }

    /// Sets whether filled URL fields short-circuit generation.
    #[must_use]
    pub fn with_skip_if_url_exists(mut self, skip: bool) -> Self {
        self.skip_if_url_exists = skip;
        self
    }

    /// Sets the log sink identifier.
    #[must_use]
    pub fn with_log_sink(mut self, sink: impl Into<String>) -> Self {
        self.log_sink = Some(sink.into());
        self
    }

    /// Sets the reference zone offset in minutes east of UTC.
    #[must_use]
    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    /// Sets whether form submissions must carry the trigger flag.
    #[must_use]
    pub fn with_form_submit_requires_trigger(mut self, required: bool) -> Self {
        self.form_submit_requires_trigger = required;
        self
    }

    /// Checks the configuration for missing or conflicting options.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.template_id.trim().is_empty() {
            return Err(ConfigError::Missing("template_id"));
        }
        if self.output_location_id.trim().is_empty() {
            return Err(ConfigError::Missing("output_location_id"));
        }

        let mut seen = HashSet::new();
        for name in self.control_fields.names() {
            let name = name.trim();
            if name.is_empty() {
                return Err(ConfigError::Missing("control_fields"));
            }
            if !seen.insert(name) {
                return Err(ConfigError::DuplicateControlField(name.to_string()));
            }
        }

        if offset_from_minutes(self.utc_offset_minutes).is_none() {
            return Err(ConfigError::InvalidOffset(self.utc_offset_minutes));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_control_fields_trimmed() {
        let fields = ControlFields {
            url: " Document URL ".to_string(),
            trigger: "\tGenerate".to_string(),
            ..ControlFields::default()
        }
        .trimmed();

        assert_eq!(fields, ControlFields::default());
    }

    #[test]
    fn test_defaults() {
        let config = GenerationConfig::new("tpl", "out");
        assert!(config.clear_trigger_after_success);
        assert!(config.skip_if_url_exists);
        assert_eq!(config.control_fields.status, "Status");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_applies_defaults() {
        let config = GenerationConfig::from_json_str(
            r#"{
                "template_id": "tpl-1",
                "output_location_id": "folder-9",
                "control_fields": {"trigger": "Create Doc"},
                "skip_if_url_exists": false
            }"#,
        )
        .unwrap();

        assert_eq!(config.control_fields.trigger, "Create Doc");
        assert_eq!(config.control_fields.url, "Document URL");
        assert!(!config.skip_if_url_exists);
        assert!(config.clear_trigger_after_success);
        assert_eq!(config.naming_pattern, "{{Project}} - {{Name}} - {{Date}}");
    }

    #[test]
    fn test_invalid_json() {
        let err = GenerationConfig::from_json_str("{not json").unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::InvalidConfig);
    }

    #[test]
    fn test_validate_missing_ids() {
        assert_eq!(
            GenerationConfig::new(" ", "out").validate(),
            Err(ConfigError::Missing("template_id"))
        );
        assert_eq!(
            GenerationConfig::new("tpl", "").validate(),
            Err(ConfigError::Missing("output_location_id"))
        );
    }

    #[test]
    fn test_validate_duplicate_control_fields() {
        let fields = ControlFields {
            url: "Status".to_string(),
            ..ControlFields::default()
        };
        let config = GenerationConfig::new("tpl", "out").with_control_fields(fields);

        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateControlField("Status".to_string()))
        );
    }

    #[test]
    fn test_validate_offset() {
        let config = GenerationConfig::new("tpl", "out").with_utc_offset_minutes(9 * 60);
        assert!(config.validate().is_ok());

        let config = GenerationConfig::new("tpl", "out").with_utc_offset_minutes(24 * 60);
        assert_eq!(config.validate(), Err(ConfigError::InvalidOffset(1440)));
    }

    #[test]
    fn test_control_field_membership() {
        let fields = ControlFields::default();
        assert!(fields.contains("Generate"));
        assert!(fields.contains(" Status "));
        assert!(!fields.contains("Name"));
    }

    #[tokio::test]
    async fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docflow.json");
        std::fs::write(&path, r#"{"template_id": "t", "output_location_id": "o"}"#).unwrap();

        let config = GenerationConfig::from_file(&path).await.unwrap();
        assert_eq!(config.template_id, "t");

        assert!(GenerationConfig::from_file(dir.path().join("nope.json")).await.is_err());
    }
}
