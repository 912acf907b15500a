use extraction::aggregate::{AggregateEvent, AggregateEvents, EmptyText};
use log::Level;

/// Reports aggregation events through the `log` facade.
#[derive(Debug, Default)]
pub struct LogEvents;

impl AggregateEvents for LogEvents {
    fn on_event(&mut self, event: AggregateEvent) {
        let (level, message) = describe(event);
        log::log!(level, "{message}");
    }
}

/// Log level and message for an event.
fn describe(event: AggregateEvent) -> (Level, String) {
    match event {
        AggregateEvent::Processing { name } => (Level::Info, format!("Processing file: {name}")),
        AggregateEvent::FieldResolved { name, field, value } => {
            (Level::Debug, format!("{name}: field {field}: {value}"))
        }
        // Typically a scanned document without a text layer.
        AggregateEvent::DocumentSkipped { err } if err.source.is::<EmptyText>() => (
            Level::Warn,
            format!("Skipping file {:?}: no text was extracted", err.name),
        ),
        AggregateEvent::DocumentSkipped { err } => (
            Level::Error,
            format!("Skipping file: {:#}", anyhow::Error::from(err)),
        ),
        AggregateEvent::NoDocuments => (
            Level::Warn,
            "No PDF files were found in the source folder".to_string(),
        ),
        AggregateEvent::Completed { records, skipped } => (
            Level::Info,
            format!("Processed {records} file(s), skipped {skipped}"),
        ),
    }
}
