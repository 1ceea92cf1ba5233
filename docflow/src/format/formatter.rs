//! Canonical text rendering of field values.

use crate::core::FieldValue;
use crate::utils::timestamps::{format_date, DATE_FORMAT};

/// Converts typed field values into their interpolation text.
///
/// Every value has a defined textual form, so formatting never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueFormatter;

impl ValueFormatter {
    /// Creates a new formatter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Formats a value.
    ///
    /// - empty → `""`
    /// - boolean → `"Yes"` / `"No"`
    /// - date and date-time → `yyyy-MM-dd`
    /// - numbers → shortest decimal form (`1`, `2.5`)
    /// - text → verbatim
    #[must_use]
    pub fn format(&self, value: &FieldValue) -> String {
        match value {
            FieldValue::Empty => String::new(),
            FieldValue::Bool(true) => "Yes".to_string(),
            FieldValue::Bool(false) => "No".to_string(),
            FieldValue::Date(date) => format_date(date),
            FieldValue::DateTime(dt) => dt.format(DATE_FORMAT).to_string(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(s) => s.clone(),
        }
    }

    /// Formats an optional value, treating absence as empty.
    #[must_use]
    pub fn format_opt(&self, value: Option<&FieldValue>) -> String {
        value.map(|v| self.format(v)).unwrap_or_default()
    }
}
