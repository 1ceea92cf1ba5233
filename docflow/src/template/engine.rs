//! The template engine.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use super::DocumentBody;
use crate::core::Record;
use crate::errors::DocflowError;
use crate::format::ValueFormatter;

/// Name used when the naming pattern is empty.
pub const DEFAULT_DOCUMENT_NAME: &str = "Generated Document";

/// `{{`, one or more non-`}` characters, `}}`. The key is trimmed afterwards.
static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^}]+)\}\}").expect("token pattern is valid"));

/// Substitutes `{{ key }}` tokens with formatted record values.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateEngine {
    formatter: ValueFormatter,
}

impl TemplateEngine {
    /// Creates an engine using the given formatter.
    #[must_use]
    pub fn new(formatter: ValueFormatter) -> Self {
        Self { formatter }
    }

    /// Returns the formatter used for values.
    #[must_use]
    pub fn formatter(&self) -> &ValueFormatter {
        &self.formatter
    }

    /// Interpolates a pattern against a record.
    ///
    /// Tokens are replaced left to right in a single pass; substituted text
    /// is never rescanned. Keys missing from the record render as empty
    /// text. An empty pattern yields [`DEFAULT_DOCUMENT_NAME`].
    #[must_use]
    pub fn interpolate(&self, pattern: &str, record: &Record) -> String {
        if pattern.is_empty() {
            return DEFAULT_DOCUMENT_NAME.to_string();
        }

        TOKEN
            .replace_all(pattern, |caps: &Captures<'_>| {
                let key = caps[1].trim();
                self.formatter.format_opt(record.get(key))
            })
            .into_owned()
    }

    /// Returns the distinct keys referenced by a pattern, in order.
    #[must_use]
    pub fn placeholders(&self, pattern: &str) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        for caps in TOKEN.captures_iter(pattern) {
            let key = caps[1].trim().to_string();
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    /// Substitutes every record field into a document body.
    ///
    /// Applies one replace-all per field, in record order. Body tokens that
    /// name no field of the record are left untouched.
    ///
    /// Returns the total number of replacements.
    pub fn substitute_body(
        &self,
        body: &mut DocumentBody,
        record: &Record,
    ) -> Result<usize, DocflowError> {
        let mut total = 0;
        for (key, value) in record.iter() {
            let pattern = field_token(key)?;
            total += body.replace_all(&pattern, &self.formatter.format(value));
        }
        Ok(total)
    }
}

/// Builds the body token pattern for one field.
fn field_token(key: &str) -> Result<Regex, DocflowError> {
    let pattern = format!(r"\{{\{{\s*{}\s*\}}\}}", regex::escape(key));
    Regex::new(&pattern)
        .map_err(|e| DocflowError::substitution(format!("invalid token for field '{key}': {e}")))
}
