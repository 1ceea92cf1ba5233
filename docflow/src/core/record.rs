//! Records: one data row as an ordered field map.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::FieldValue;

/// An ordered mapping from field name to typed value.
///
/// Field names are trimmed on insertion and compared case-sensitively.
/// Iteration follows header order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    fields: IndexMap<String, FieldValue>,
}

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from a header row and a value row.
    ///
    /// Blank header names are skipped. Missing trailing values become
    /// [`FieldValue::Empty`]; surplus values are ignored. A repeated header
    /// resolves to its first column, the same column stores write to.
    #[must_use]
    pub fn from_row(headers: &[String], values: Vec<FieldValue>) -> Self {
        let mut record = Self::new();
        let mut values = values.into_iter();
        for header in headers {
            let value = values.next().unwrap_or_default();
            let name = header.trim();
            if name.is_empty() || record.contains(name) {
                continue;
            }
            record.insert(name, value);
        }
        record
    }

    /// Builds a record from a JSON object.
    ///
    /// Returns `None` if the value is not an object.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let object = value.as_object()?;
        Some(
            object
                .iter()
                .map(|(k, v)| (k.clone(), FieldValue::from_json(v)))
                .collect(),
        )
    }

    /// Adds a field, builder style.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts or replaces a field value.
    pub fn insert(&mut self, name: &str, value: impl Into<FieldValue>) {
        self.fields.insert(name.trim().to_string(), value.into());
    }

    /// Gets a field value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Checks if a field is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Returns true if the field is absent or holds an empty value.
    #[must_use]
    pub fn is_blank(&self, name: &str) -> bool {
        self.get(name).map_or(true, FieldValue::is_empty)
    }

    /// Iterates fields in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns field names in header order.
    #[must_use]
    pub fn field_names(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Converts the record to a JSON object.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        serde_json::Value::Object(map)
    }
}

impl<K: AsRef<str>> FromIterator<(K, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, FieldValue)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (name, value) in iter {
            record.insert(name.as_ref(), value);
        }
        record
    }
}
