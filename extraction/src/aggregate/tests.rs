use std::collections::BTreeSet;

use anyhow::anyhow;
use googletest::prelude::*;

use super::*;

const FIELDS: &[&str] = &["Nome", "PIS/PASEP/NIT", "Cargo"];

/// Records a summary of each event as a string.
#[derive(Default)]
struct RecordedEvents(Vec<String>);

impl AggregateEvents for RecordedEvents {
    fn on_event(&mut self, event: AggregateEvent) {
        let summary = match event {
            AggregateEvent::Processing { name } => format!("processing {name}"),
            AggregateEvent::FieldResolved { name, field, value } => {
                format!("resolved {name} {field}={value}")
            }
            AggregateEvent::DocumentSkipped { err } => format!("skipped {}", err.name),
            AggregateEvent::NoDocuments => "no documents".to_string(),
            AggregateEvent::Completed { records, skipped } => {
                format!("completed {records} records, {skipped} skipped")
            }
        };
        self.0.push(summary);
    }
}

fn fields() -> Vec<String> {
    FIELDS.iter().map(|field| field.to_string()).collect()
}

fn document(name: &str, text: &str) -> std::result::Result<Document, DocumentError> {
    Ok(Document {
        name: name.to_string(),
        bytes: text.as_bytes().to_vec(),
    })
}

/// Extractor that treats the bytes as UTF-8 text, failing on "corrupt".
fn text_passthrough_extractor() -> MockTextExtractor {
    let mut extractor = MockTextExtractor::new();
    extractor.expect_extract_text().returning(|bytes| {
        let text = String::from_utf8(bytes.to_vec())?;
        if text == "corrupt" {
            Err(anyhow!("corrupt PDF"))
        } else {
            Ok(text)
        }
    });
    extractor
}

#[gtest]
fn test_skips_failed_document() -> anyhow::Result<()> {
    let extractor = text_passthrough_extractor();
    let aggregator = Aggregator::new(&extractor, &FieldRules::builtin(), &fields())?;
    let mut events = RecordedEvents::default();

    // GIVEN: three documents where the second fails extraction.
    let documents = vec![
        document("a.pdf", "Nome: Ana\nPIS: 111.11111.11-1\n"),
        document("b.pdf", "corrupt"),
        document("c.pdf", "Nome: Bruno\nCargo: Analista\n"),
    ];

    // WHEN: the batch is processed.
    let results = aggregator.run(documents, &mut events);

    // THEN: only the two readable documents have records, in input order.
    let names: Vec<&str> = results.records().iter().map(Record::document).collect();
    expect_eq!(names, vec!["a.pdf", "c.pdf"]);

    // THEN: the failure is reported.
    expect_that!(events.0, contains(eq("skipped b.pdf")));
    expect_eq!(
        events.0.last().map(String::as_str),
        Some("completed 2 records, 1 skipped")
    );
    Ok(())
}

#[gtest]
fn test_records_are_rectangular() -> anyhow::Result<()> {
    let extractor = text_passthrough_extractor();
    let aggregator = Aggregator::new(&extractor, &FieldRules::builtin(), &fields())?;

    let documents = vec![
        document("a.pdf", "Nome: Ana\n"),
        document("b.pdf", "Cargo: Analista\nPIS 222.22222.22-2\n"),
        document("c.pdf", "Sem campos conhecidos.\n"),
    ];

    let results = aggregator.run(documents, &mut NoEvents);

    let expected_columns: BTreeSet<&str> = ["Archivo", "Nome", "PIS/PASEP/NIT", "Cargo"].into();
    expect_eq!(
        results.columns().into_iter().collect::<BTreeSet<_>>(),
        expected_columns
    );
    for record in results.records() {
        let keys: Vec<&str> = record.values().iter().map(|(name, _)| name.as_str()).collect();
        expect_eq!(keys, FIELDS.to_vec());
    }
    expect_eq!(
        results.records()[2].get("Nome"),
        Some(&FieldValue::NotFound)
    );
    Ok(())
}

#[gtest]
fn test_empty_text_is_skipped() -> anyhow::Result<()> {
    let extractor = text_passthrough_extractor();
    let aggregator = Aggregator::new(&extractor, &FieldRules::builtin(), &fields())?;
    let mut events = RecordedEvents::default();

    let results = aggregator.run(vec![document("blank.pdf", " \n\n")], &mut events);

    expect_true!(results.is_empty());
    expect_that!(events.0, contains(eq("skipped blank.pdf")));
    Ok(())
}

#[gtest]
fn test_unreadable_document_is_skipped() -> anyhow::Result<()> {
    let mut extractor = MockTextExtractor::new();
    extractor.expect_extract_text().never();
    let aggregator = Aggregator::new(&extractor, &FieldRules::builtin(), &fields())?;
    let mut events = RecordedEvents::default();

    let unreadable = Err(DocumentError {
        name: "locked.pdf".into(),
        source: anyhow!("permission denied"),
    });
    let results = aggregator.run(vec![unreadable], &mut events);

    expect_true!(results.is_empty());
    expect_eq!(
        events.0,
        vec![
            "skipped locked.pdf".to_string(),
            "completed 0 records, 1 skipped".to_string(),
        ]
    );
    Ok(())
}

#[gtest]
fn test_no_documents_is_reported() -> anyhow::Result<()> {
    let extractor = MockTextExtractor::new();
    let aggregator = Aggregator::new(&extractor, &FieldRules::builtin(), &fields())?;
    let mut events = RecordedEvents::default();

    let results = aggregator.run(Vec::new(), &mut events);

    expect_true!(results.is_empty());
    expect_eq!(
        events.0,
        vec![
            "no documents".to_string(),
            "completed 0 records, 0 skipped".to_string(),
        ]
    );
    Ok(())
}

#[gtest]
fn test_field_values_are_reported() -> anyhow::Result<()> {
    let extractor = text_passthrough_extractor();
    let fields = vec!["Nome".to_string(), "Cargo".to_string()];
    let aggregator = Aggregator::new(&extractor, &FieldRules::builtin(), &fields)?;
    let mut events = RecordedEvents::default();

    aggregator.run(vec![document("a.pdf", "Nome: Ana\n")], &mut events);

    expect_eq!(
        events.0,
        vec![
            "processing a.pdf".to_string(),
            r#"resolved a.pdf Nome="Ana""#.to_string(),
            "resolved a.pdf Cargo=<not found>".to_string(),
            "completed 1 records, 0 skipped".to_string(),
        ]
    );
    Ok(())
}

#[gtest]
fn test_repeated_fields_are_resolved_once() -> anyhow::Result<()> {
    let extractor = MockTextExtractor::new();
    let fields = vec!["Nome".to_string(), "Cargo".to_string(), "Nome".to_string()];

    let aggregator = Aggregator::new(&extractor, &FieldRules::builtin(), &fields)?;

    expect_eq!(aggregator.field_names().collect::<Vec<_>>(), vec!["Nome", "Cargo"]);
    Ok(())
}

#[gtest]
fn test_custom_file_column() -> anyhow::Result<()> {
    let extractor = text_passthrough_extractor();
    let aggregator = Aggregator::new(&extractor, &FieldRules::builtin(), &fields())?
        .with_file_column("Arquivo");

    let results = aggregator.run(vec![document("a.pdf", "Nome: Ana\n")], &mut NoEvents);

    expect_eq!(results.file_column(), "Arquivo");
    Ok(())
}
