//! Typed field values.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A typed value held by a record field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// No value.
    #[default]
    Empty,
    /// Free text.
    Text(String),
    /// A numeric value.
    Number(f64),
    /// A boolean value (checkbox cells).
    Bool(bool),
    /// A calendar date.
    Date(NaiveDate),
    /// A date and time in the reference zone.
    DateTime(NaiveDateTime),
}

impl FieldValue {
    /// Creates a text value.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Returns true if the value carries no content.
    ///
    /// Text that is empty or only whitespace counts as empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Returns the text content, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Converts a loosely typed JSON value into a field value.
    ///
    /// Arrays and objects are kept as their JSON text.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Empty,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Empty, Self::Number),
            serde_json::Value::String(s) => Self::Text(s.clone()),
            other => Self::Text(other.to_string()),
        }
    }

    /// Converts the value to plain JSON.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Empty => serde_json::Value::Null,
            Self::Text(s) => serde_json::json!(s),
            Self::Number(n) => serde_json::json!(n),
            Self::Bool(b) => serde_json::json!(b),
            Self::Date(d) => serde_json::json!(d.format("%Y-%m-%d").to_string()),
            Self::DateTime(dt) => serde_json::json!(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for FieldValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_empty() {
        assert!(FieldValue::Empty.is_empty());
        assert!(FieldValue::text("   ").is_empty());
        assert!(!FieldValue::text("x").is_empty());
        assert!(!FieldValue::Bool(false).is_empty());
        assert!(!FieldValue::Number(0.0).is_empty());
    }

    #[test]
    fn test_from_json() {
        assert_eq!(FieldValue::from_json(&serde_json::json!(null)), FieldValue::Empty);
        assert_eq!(FieldValue::from_json(&serde_json::json!(true)), FieldValue::Bool(true));
        assert_eq!(FieldValue::from_json(&serde_json::json!(3)), FieldValue::Number(3.0));
        assert_eq!(
            FieldValue::from_json(&serde_json::json!("Ann")),
            FieldValue::text("Ann")
        );
        assert_eq!(
            FieldValue::from_json(&serde_json::json!([1, 2])),
            FieldValue::text("[1,2]")
        );
    }

    #[test]
    fn test_option_conversion() {
        let none: Option<&str> = None;
        assert_eq!(FieldValue::from(none), FieldValue::Empty);
        assert_eq!(FieldValue::from(Some("x")), FieldValue::text("x"));
    }

    #[test]
    fn test_tagged_serialization() {
        let value = FieldValue::Date(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json, serde_json::json!({"type": "date", "value": "2024-01-05"}));

        let back: FieldValue = serde_json::from_value(json).unwrap();
        assert_eq!(back, value);
    }
}
