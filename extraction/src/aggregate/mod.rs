//! Runs the field lookups over a batch of documents.

use anyhow::{Result, anyhow};

use crate::{
    fieldmatch::{FieldRule, FieldRules, FieldValue, RuleError},
    record::{DEFAULT_FILE_COLUMN, Record, ResultSet},
    source::{Document, DocumentError},
};

#[cfg(test)]
mod tests;

/// Converts the raw bytes of a document into its text.
#[cfg_attr(test, mockall::automock)]
pub trait TextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String>;
}

/// Extraction produced no text, or only whitespace.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
#[error("no text was extracted")]
pub struct EmptyText;

/// Aggregation event emitted to report progress.
#[derive(Debug)]
pub enum AggregateEvent<'a> {
    /// A document is about to be processed.
    Processing { name: &'a str },
    /// A field has been looked up within a document.
    FieldResolved {
        name: &'a str,
        field: &'a str,
        value: &'a FieldValue,
    },
    /// A document could not be read or converted to text, and contributes no
    /// record.
    DocumentSkipped { err: DocumentError },
    /// The batch contained no documents at all.
    NoDocuments,
    /// All documents have been processed and no more events will follow.
    Completed { records: usize, skipped: usize },
}

/// Trait to implement to receive notifications about aggregation events.
pub trait AggregateEvents {
    fn on_event(&mut self, event: AggregateEvent);
}

/// Builds one [Record] per readable document, holding each requested field.
pub struct Aggregator<'a> {
    extractor: &'a dyn TextExtractor,
    fields: Vec<(String, FieldRule)>,
    file_column: String,
}

impl<'a> Aggregator<'a> {
    /// Creates an [Aggregator] for `fields`, resolving the rule for each
    /// field up front. Repeated field names are only looked up once.
    pub fn new(
        extractor: &'a dyn TextExtractor,
        rules: &FieldRules,
        fields: &[String],
    ) -> Result<Self, RuleError> {
        let mut resolved: Vec<(String, FieldRule)> = Vec::with_capacity(fields.len());
        for field in fields {
            if resolved.iter().any(|(name, _)| name == field) {
                continue;
            }
            resolved.push((field.clone(), rules.rule_for(field)?));
        }

        Ok(Self {
            extractor,
            fields: resolved,
            file_column: DEFAULT_FILE_COLUMN.to_string(),
        })
    }

    /// Sets the name of the column holding each document's name.
    pub fn with_file_column(mut self, file_column: impl Into<String>) -> Self {
        self.file_column = file_column.into();
        self
    }

    /// Field names in the order they appear in each [Record].
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Processes each document in turn. Documents that cannot be read or
    /// produce no text are reported and skipped, never aborting the batch.
    pub fn run<I>(&self, documents: I, events: &mut dyn AggregateEvents) -> ResultSet
    where
        I: IntoIterator<Item = Result<Document, DocumentError>>,
    {
        let mut results = ResultSet::new(self.file_column.clone());
        let mut seen = 0;
        let mut skipped = 0;

        for document in documents {
            seen += 1;
            let document = match document {
                Ok(document) => document,
                Err(err) => {
                    skipped += 1;
                    events.on_event(AggregateEvent::DocumentSkipped { err });
                    continue;
                }
            };

            events.on_event(AggregateEvent::Processing {
                name: &document.name,
            });

            match self.document_text(&document) {
                Ok(text) => results.push(self.record_for(&document.name, &text, events)),
                Err(err) => {
                    skipped += 1;
                    events.on_event(AggregateEvent::DocumentSkipped { err });
                }
            }
        }

        if seen == 0 {
            events.on_event(AggregateEvent::NoDocuments);
        }
        events.on_event(AggregateEvent::Completed {
            records: results.len(),
            skipped,
        });

        results
    }

    /// Looks up every field within `text`.
    pub fn record_for(
        &self,
        name: &str,
        text: &str,
        events: &mut dyn AggregateEvents,
    ) -> Record {
        let values = self
            .fields
            .iter()
            .map(|(field, rule)| {
                let value = rule.find(text);
                events.on_event(AggregateEvent::FieldResolved {
                    name,
                    field,
                    value: &value,
                });
                (field.clone(), value)
            })
            .collect();
        Record::new(name, values)
    }

    fn document_text(&self, document: &Document) -> Result<String, DocumentError> {
        let text = self
            .extractor
            .extract_text(&document.bytes)
            .and_then(|text| {
                if text.trim().is_empty() {
                    Err(anyhow!(EmptyText))
                } else {
                    Ok(text)
                }
            });
        text.map_err(|source| DocumentError {
            name: document.name.clone(),
            source,
        })
    }
}

/// [AggregateEvents] that ignores all events.
#[derive(Debug, Default)]
pub struct NoEvents;

impl AggregateEvents for NoEvents {
    fn on_event(&mut self, _event: AggregateEvent) {}
}
