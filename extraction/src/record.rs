use std::collections::BTreeSet;

use crate::fieldmatch::FieldValue;

/// Default name of the column holding each document's name.
pub const DEFAULT_FILE_COLUMN: &str = "Archivo";

/// Default text written in place of a field that was not found.
pub const DEFAULT_NOT_FOUND: &str = "No encontrado";

/// Field values extracted from a single document.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Record {
    document: String,
    values: Vec<(String, FieldValue)>,
}

impl Record {
    pub fn new(document: impl Into<String>, values: Vec<(String, FieldValue)>) -> Self {
        Self {
            document: document.into(),
            values,
        }
    }

    /// Name of the source document.
    pub fn document(&self) -> &str {
        &self.document
    }

    /// Field names and their values, in configured order.
    pub fn values(&self) -> &[(String, FieldValue)] {
        &self.values
    }

    /// Returns the value of `field`, if it was requested.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }
}

/// Records for a batch of documents, in processing order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResultSet {
    file_column: String,
    records: Vec<Record>,
}

impl ResultSet {
    pub fn new(file_column: impl Into<String>) -> Self {
        Self {
            file_column: file_column.into(),
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn file_column(&self) -> &str {
        &self.file_column
    }

    /// Sorted union of the column names across all records, including the
    /// file column.
    pub fn columns(&self) -> Vec<&str> {
        let mut columns: BTreeSet<&str> = BTreeSet::new();
        columns.insert(&self.file_column);
        for record in &self.records {
            columns.extend(record.values.iter().map(|(name, _)| name.as_str()));
        }
        columns.into_iter().collect()
    }

    /// Cells of each record, aligned with `columns`. Fields that were not
    /// found are rendered as `not_found`.
    pub fn rows<'a>(
        &'a self,
        columns: &'a [&'a str],
        not_found: &'a str,
    ) -> impl Iterator<Item = Vec<&'a str>> + 'a {
        self.records.iter().map(move |record| {
            columns
                .iter()
                .map(|column| {
                    if *column == self.file_column {
                        record.document()
                    } else {
                        record
                            .get(column)
                            .map(|value| value.or_placeholder(not_found))
                            .unwrap_or("")
                    }
                })
                .collect()
        })
    }
}
