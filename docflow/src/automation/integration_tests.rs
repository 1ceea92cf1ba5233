//! End-to-end tests wiring configuration, stores and triggers.

use async_trait::async_trait;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

use super::{Automation, IgnoreReason, TriggerEvent, TriggerResult};
use crate::config::GenerationConfig;
use crate::core::{FieldValue, GenerationOutcome, SkipReason};
use crate::errors::{DocflowError, ErrorKind};
use crate::events::CollectingEventSink;
use crate::stores::{
    ArtifactHandle, ArtifactStore, FsArtifactStore, FsTemplateStore, InMemoryArtifactStore,
    InMemoryRecordStore, InMemoryTemplateStore, Template,
};
use crate::template::DocumentBody;
use crate::testing::{
    assert_created, assert_skipped, offer_template, project_record, project_store,
    OUTPUT_LOCATION, TEMPLATE_ID,
};
use crate::utils::timestamps::{offset_from_minutes, FixedClock, MockClock};

fn config() -> GenerationConfig {
    GenerationConfig::new(TEMPLATE_ID, OUTPUT_LOCATION)
}

fn templates() -> Arc<InMemoryTemplateStore> {
    Arc::new(InMemoryTemplateStore::new().with_template(offer_template()))
}

fn artifacts() -> Arc<InMemoryArtifactStore> {
    Arc::new(InMemoryArtifactStore::new().with_location(OUTPUT_LOCATION))
}

fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::at_utc(
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap(),
    ))
}

fn single(result: TriggerResult) -> GenerationOutcome {
    match result {
        TriggerResult::Single(_, outcome) => outcome,
        other => panic!("Expected single outcome, got {other:?}"),
    }
}

#[tokio::test]
async fn test_filesystem_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let template_root = dir.path().join("templates");
    let output_root = dir.path().join("output");
    std::fs::create_dir_all(&template_root).unwrap();
    std::fs::create_dir_all(output_root.join("generated")).unwrap();
    std::fs::write(
        template_root.join("offer.txt"),
        "Dear {{ Name }}, welcome to {{Project}} on {{Date}}. Ref: {{Unknown}}",
    )
    .unwrap();

    let records = Arc::new(InMemoryRecordStore::from_records(&[project_record("Ann", true)]));
    let automation = Automation::builder(
        GenerationConfig::new("offer.txt", "generated"),
        records.clone(),
        Arc::new(FsTemplateStore::new(&template_root)),
        Arc::new(FsArtifactStore::new(&output_root)),
    )
    .with_clock(fixed_clock())
    .build()
    .unwrap();

    let outcome = single(
        automation
            .handle(TriggerEvent::Edit {
                row: 0,
                field: "Generate".to_string(),
            })
            .await
            .unwrap(),
    );

    assert_created(&outcome);
    let artifact = outcome.artifact().unwrap();
    assert_eq!(artifact.name, "Acme - Ann - 2024-01-05");
    assert_eq!(artifact.id, "generated/Acme - Ann - 2024-01-05.txt");
    assert!(artifact.url.starts_with("file://"));

    let written =
        std::fs::read_to_string(output_root.join("generated/Acme - Ann - 2024-01-05.txt")).unwrap();
    assert_eq!(written, "Dear Ann, welcome to Acme on 2024-01-05. Ref: {{Unknown}}");

    let row = records.snapshot(0).unwrap();
    assert_eq!(row.get("Document URL"), Some(&FieldValue::text(&artifact.url)));
    assert_eq!(row.get("Generated At"), Some(&FieldValue::text("2024-03-01 09:00:00")));
    assert_eq!(row.get("Generate"), Some(&FieldValue::Bool(false)));
}

#[tokio::test]
async fn test_filesystem_missing_location_is_recorded() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("offer.txt"), "{{Name}}").unwrap();

    let records = Arc::new(InMemoryRecordStore::from_records(&[project_record("Ann", true)]));
    let automation = Automation::builder(
        GenerationConfig::new("offer.txt", "nowhere"),
        records.clone(),
        Arc::new(FsTemplateStore::new(dir.path())),
        Arc::new(FsArtifactStore::new(dir.path())),
    )
    .build()
    .unwrap();

    let outcome = single(automation.handle(TriggerEvent::FormSubmit { row: 0 }).await.unwrap());

    assert!(outcome.is_failed());
    assert_eq!(
        records.snapshot(0).unwrap().get("Status"),
        Some(&FieldValue::text("Error: Output location not found: nowhere"))
    );
}

#[tokio::test]
async fn test_edit_of_other_field_is_ignored() {
    let records = Arc::new(project_store(&["Ann"]));
    let artifacts = artifacts();
    let automation = Automation::builder(config(), records, templates(), artifacts.clone())
        .build()
        .unwrap();

    let result = automation
        .handle(TriggerEvent::Edit {
            row: 0,
            field: "Name".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(
        result,
        TriggerResult::Ignored(IgnoreReason::UnwatchedField("Name".to_string()))
    );
    assert!(artifacts.is_empty());
}

#[tokio::test]
async fn test_edit_with_falsy_trigger_is_skipped() {
    let records = Arc::new(InMemoryRecordStore::from_records(&[project_record("Ann", "no")]));
    let automation = Automation::builder(config(), records, templates(), artifacts())
        .build()
        .unwrap();

    let outcome = single(
        automation
            .handle(TriggerEvent::Edit {
                row: 0,
                field: " Generate ".to_string(),
            })
            .await
            .unwrap(),
    );
    assert_skipped(&outcome, SkipReason::NotTriggered);
}

#[tokio::test]
async fn test_form_submit_trigger_policy() {
    let rows = [project_record("Ann", FieldValue::Empty)];

    let strict = Automation::builder(
        config(),
        Arc::new(InMemoryRecordStore::from_records(&rows)),
        templates(),
        artifacts(),
    )
    .build()
    .unwrap();
    assert_skipped(
        &single(strict.handle(TriggerEvent::FormSubmit { row: 0 }).await.unwrap()),
        SkipReason::NotTriggered,
    );

    let lenient = Automation::builder(
        config().with_form_submit_requires_trigger(false),
        Arc::new(InMemoryRecordStore::from_records(&rows)),
        templates(),
        artifacts(),
    )
    .build()
    .unwrap();
    assert_created(&single(
        lenient.handle(TriggerEvent::FormSubmit { row: 0 }).await.unwrap(),
    ));
}

#[tokio::test]
async fn test_manual_run_executes_batch() {
    let records = Arc::new(project_store(&["Ann", "Bob"]));
    let events = Arc::new(CollectingEventSink::new());
    let automation = Automation::builder(config(), records, templates(), artifacts())
        .with_event_sink(events.clone())
        .build()
        .unwrap();

    let TriggerResult::Batch(summary) = automation.handle(TriggerEvent::Manual).await.unwrap()
    else {
        panic!("Expected batch result");
    };

    assert_eq!(summary.created, 2);
    assert_eq!(events.events_of_type("record.").len(), 2);
    assert_eq!(events.events_of_type("batch.").len(), 1);
}

#[tokio::test]
async fn test_log_store_receives_event_rows() {
    let records = Arc::new(project_store(&["Ann"]));
    let log = Arc::new(InMemoryRecordStore::new(Vec::new()));
    let automation = Automation::builder(config(), records, templates(), artifacts())
        .with_clock(fixed_clock())
        .with_log_store(log.clone())
        .build()
        .unwrap();

    automation.handle(TriggerEvent::Manual).await.unwrap();

    assert_eq!(log.headers(), vec!["Timestamp", "Event", "Row", "Detail"]);
    let first = log.snapshot(0).unwrap();
    assert_eq!(first.get("Event"), Some(&FieldValue::text("record.created")));
    assert_eq!(first.get("Row"), Some(&FieldValue::Number(0.0)));
    assert_eq!(first.get("Timestamp"), Some(&FieldValue::text("2024-03-01 09:00:00")));
    assert_eq!(
        log.snapshot(1).unwrap().get("Event"),
        Some(&FieldValue::text("batch.completed"))
    );
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let err = Automation::builder(
        GenerationConfig::new("", OUTPUT_LOCATION),
        Arc::new(project_store(&[])),
        templates(),
        artifacts(),
    )
    .build()
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConfig);

    let err = Automation::builder(
        config().with_utc_offset_minutes(100_000),
        Arc::new(project_store(&[])),
        templates(),
        artifacts(),
    )
    .build()
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConfig);
}

#[tokio::test]
async fn test_generated_at_uses_reference_offset() {
    let offset = offset_from_minutes(-5 * 60).unwrap();
    let at = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(3, 30, 0)
        .unwrap()
        .and_utc()
        .with_timezone(&offset);
    let mut clock = MockClock::new();
    clock.expect_now().times(1).return_const(at);

    let records = Arc::new(project_store(&["Ann"]));
    let automation = Automation::builder(config(), records.clone(), templates(), artifacts())
        .with_clock(Arc::new(clock))
        .build()
        .unwrap();

    automation.processor().process(0).await;

    assert_eq!(
        records.snapshot(0).unwrap().get("Generated At"),
        Some(&FieldValue::text("2023-12-31 22:30:00"))
    );
}

#[tokio::test]
async fn test_values_are_substituted_literally() {
    let record = project_record("A.*B $1 {{Project}}", true);
    let records = Arc::new(InMemoryRecordStore::from_records(&[record]));
    let templates = Arc::new(InMemoryTemplateStore::new().with_template(Template::new(
        TEMPLATE_ID,
        "Offer",
        "Hello {{Name}}!",
    )));
    let artifacts = artifacts();
    let automation = Automation::builder(
        config().with_naming_pattern("{{Name}}"),
        records,
        templates,
        artifacts.clone(),
    )
    .build()
    .unwrap();

    let outcome = automation.processor().process(0).await;
    let artifact = outcome.artifact().unwrap();

    assert_eq!(artifact.name, "A.*B $1 {{Project}}");
    // Project is substituted before Name, so the token carried in by the
    // Name value survives.
    assert_eq!(artifacts.get(&artifact.id).unwrap().body, "Hello A.*B $1 {{Project}}!");
}

/// Artifact store that yields while copying, so a second attempt can race.
struct SlowArtifactStore {
    inner: Arc<InMemoryArtifactStore>,
}

#[async_trait]
impl ArtifactStore for SlowArtifactStore {
    async fn copy(
        &self,
        template: &Template,
        name: &str,
        location: &str,
    ) -> Result<ArtifactHandle, DocflowError> {
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.inner.copy(template, name, location).await
    }

    async fn open_body(&self, artifact: &ArtifactHandle) -> Result<DocumentBody, DocflowError> {
        self.inner.open_body(artifact).await
    }

    async fn finalize(
        &self,
        artifact: &ArtifactHandle,
        body: DocumentBody,
    ) -> Result<(), DocflowError> {
        self.inner.finalize(artifact, body).await
    }

    async fn url(&self, artifact: &ArtifactHandle) -> Result<String, DocflowError> {
        self.inner.url(artifact).await
    }
}

#[tokio::test]
async fn test_concurrent_attempts_on_one_row() {
    let records = Arc::new(project_store(&["Ann"]));
    let inner = artifacts();
    let automation = Automation::builder(
        config(),
        records,
        templates(),
        Arc::new(SlowArtifactStore {
            inner: inner.clone(),
        }),
    )
    .build()
    .unwrap();

    let (first, second) = tokio::join!(
        automation.handle(TriggerEvent::FormSubmit { row: 0 }),
        automation.handle(TriggerEvent::Edit {
            row: 0,
            field: "Generate".to_string(),
        }),
    );

    assert_created(&single(first.unwrap()));
    assert_skipped(&single(second.unwrap()), SkipReason::InProgress);
    assert_eq!(inner.len(), 1);
}
