//! Trigger-flag normalization.

use crate::core::FieldValue;

const TRUTHY_TEXT: [&str; 4] = ["true", "yes", "y", "1"];

/// Returns true if a trigger field value requests generation.
///
/// Truthy values are boolean `true`, the number `1`, and the texts
/// `true`, `yes`, `y` and `1` in any case (surrounding whitespace ignored).
#[must_use]
pub fn is_truthy(value: &FieldValue) -> bool {
    match value {
        FieldValue::Bool(b) => *b,
        #[allow(clippy::float_cmp)]
        FieldValue::Number(n) => *n == 1.0,
        FieldValue::Text(s) => {
            let normalized = s.trim().to_lowercase();
            TRUTHY_TEXT.contains(&normalized.as_str())
        }
        FieldValue::Empty | FieldValue::Date(_) | FieldValue::DateTime(_) => false,
    }
}
