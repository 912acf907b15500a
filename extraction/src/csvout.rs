//! Writes a [ResultSet] as a CSV file.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;

use crate::{
    clock::{Clock, stamped_file_name},
    record::{DEFAULT_NOT_FOUND, ResultSet},
};

/// UTF-8 byte-order mark, so that spreadsheet software detects the encoding
/// of accented text.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes CSV files named by timestamp into an output directory.
#[derive(Debug)]
pub struct CsvSink {
    output_dir: PathBuf,
    prefix: String,
    not_found: String,
}

impl CsvSink {
    pub fn new(output_dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            prefix: prefix.into(),
            not_found: DEFAULT_NOT_FOUND.to_string(),
        }
    }

    /// Sets the text written for fields that were not found.
    pub fn with_not_found(mut self, not_found: impl Into<String>) -> Self {
        self.not_found = not_found.into();
        self
    }

    /// Writes `results` to a new file, returning its path. The file only
    /// appears once completely written.
    pub fn write(&self, results: &ResultSet, clock: &dyn Clock) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("creating output directory {:?}", self.output_dir))?;

        let path = self
            .output_dir
            .join(stamped_file_name(&self.prefix, clock.now(), "csv"));
        write_atomically(&path, results, &self.not_found)
            .with_context(|| format!("writing CSV file {:?}", path))?;
        Ok(path)
    }
}

fn write_atomically(path: &Path, results: &ResultSet, not_found: &str) -> Result<()> {
    let mut file = AtomicWriteFile::open(path)?;
    write_csv(&mut file, results, not_found)?;
    // Check for error rather than implicitly discarding the temporary file.
    file.commit().with_context(|| "committing CSV file")?;
    Ok(())
}

/// Writes `results` as UTF-8 CSV, with a header row of the sorted column
/// names.
pub fn write_csv<W: Write>(mut w: W, results: &ResultSet, not_found: &str) -> Result<()> {
    w.write_all(UTF8_BOM)?;

    let mut csv_writer = csv::Writer::from_writer(w);
    let columns = results.columns();
    csv_writer.write_record(&columns)?;
    for row in results.rows(&columns, not_found) {
        csv_writer.write_record(&row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone};
    use googletest::prelude::*;
    use tempfile::tempdir;

    use super::*;
    use crate::{clock::FakeClock, fieldmatch::FieldValue, record::Record};

    fn sample_results() -> ResultSet {
        let mut results = ResultSet::new("Archivo");
        results.push(Record::new(
            "José.pdf",
            vec![
                ("Nome".into(), FieldValue::Found("José Araújo".into())),
                ("Valor".into(), FieldValue::Found("1.234,56".into())),
            ],
        ));
        results.push(Record::new(
            "b.pdf",
            vec![
                ("Nome".into(), FieldValue::Found(String::new())),
                ("Valor".into(), FieldValue::NotFound),
            ],
        ));
        results
    }

    fn fake_clock() -> FakeClock {
        FakeClock::new(Local.with_ymd_and_hms(2024, 5, 17, 14, 30, 5).unwrap())
    }

    #[gtest]
    fn test_write_csv_content() -> anyhow::Result<()> {
        let mut buffer: Vec<u8> = Vec::new();

        write_csv(&mut buffer, &sample_results(), "No encontrado")?;

        expect_that!(buffer.starts_with(UTF8_BOM), eq(true));
        let text = String::from_utf8(buffer[UTF8_BOM.len()..].to_vec())?;
        expect_eq!(
            text,
            "Archivo,Nome,Valor\n\
             José.pdf,José Araújo,\"1.234,56\"\n\
             b.pdf,,No encontrado\n"
        );
        Ok(())
    }

    #[gtest]
    fn test_write_creates_timestamped_file_in_new_directory() -> anyhow::Result<()> {
        let temp_dir = tempdir()?;
        let output_dir = temp_dir.path().join("output");
        let sink = CsvSink::new(&output_dir, "br").with_not_found("not found");

        let path = sink.write(&sample_results(), &fake_clock())?;

        expect_eq!(path, output_dir.join("br_20240517_143005.csv"));
        let contents = std::fs::read_to_string(&path)?;
        expect_true!(contents.ends_with("b.pdf,,not found\n"));
        Ok(())
    }

    #[gtest]
    fn test_write_failure_leaves_no_file() -> anyhow::Result<()> {
        let temp_dir = tempdir()?;
        // A file where the output directory should be.
        let output_dir = temp_dir.path().join("output");
        std::fs::write(&output_dir, "")?;
        let sink = CsvSink::new(&output_dir, "br");

        let result = sink.write(&sample_results(), &fake_clock());

        expect_that!(result, err(anything()));
        let entries: Vec<_> = std::fs::read_dir(temp_dir.path())?.collect();
        expect_eq!(entries.len(), 1);
        Ok(())
    }
}
