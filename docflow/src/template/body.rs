//! Mutable document bodies supporting find-and-replace.

use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};

/// The editable text body of an artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentBody {
    text: String,
}

impl DocumentBody {
    /// Creates a body from text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Returns the current text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consumes the body, returning its text.
    #[must_use]
    pub fn into_text(self) -> String {
        self.text
    }

    /// Replaces every match of `pattern` with `replacement`.
    ///
    /// The replacement is inserted literally; `$` sequences are not expanded.
    /// Returns the number of replacements.
    pub fn replace_all(&mut self, pattern: &Regex, replacement: &str) -> usize {
        let count = pattern.find_iter(&self.text).count();
        if count > 0 {
            self.text = pattern
                .replace_all(&self.text, NoExpand(replacement))
                .into_owned();
        }
        count
    }
}
