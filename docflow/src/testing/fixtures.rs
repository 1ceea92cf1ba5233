//! Record and template fixtures.

use crate::core::{FieldValue, Record};
use crate::stores::{InMemoryRecordStore, Template};

/// Template id used by the fixtures.
pub const TEMPLATE_ID: &str = "offer-template";

/// Output location used by the fixtures.
pub const OUTPUT_LOCATION: &str = "generated";

/// A template referencing `Project`, `Name` and `Date`.
#[must_use]
pub fn offer_template() -> Template {
    Template::new(
        TEMPLATE_ID,
        "Offer Letter",
        "Project: {{Project}}\nDear {{ Name }},\nStart date: {{Date}}\n",
    )
}

/// A project row with the given name and trigger value.
#[must_use]
pub fn project_record(name: &str, trigger: impl Into<FieldValue>) -> Record {
    Record::new()
        .with("Project", "Acme")
        .with("Name", name)
        .with("Date", "2024-01-05")
        .with("Generate", trigger)
        .with("Status", "")
        .with("Document URL", "")
}

/// A record store holding one triggered row per name.
#[must_use]
pub fn project_store(names: &[&str]) -> InMemoryRecordStore {
    let records: Vec<Record> = names
        .iter()
        .map(|name| project_record(name, true))
        .collect();
    InMemoryRecordStore::from_records(&records)
}
