use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use extraction::{
    aggregate::{Aggregator, NoEvents, TextExtractor},
    pdftext::PdfTextExtractor,
    record::Record,
};

use crate::config::ConfigArgs;

/// Prints the configured fields as found in a single PDF, without writing
/// any output files. Useful when tuning patterns.
#[derive(Args, Debug)]
pub struct Command {
    /// Path to the input PDF.
    pdf_path: PathBuf,

    #[command(flatten)]
    config: ConfigArgs,
}

/// Runs the subcommand.
pub fn run(cmd: &Command) -> Result<()> {
    let config = cmd.config.load()?;
    let rules = config.field_rules()?;
    let extractor = PdfTextExtractor::new();
    let aggregator = Aggregator::new(&extractor, &rules, &config.fields)?;

    let bytes =
        std::fs::read(&cmd.pdf_path).with_context(|| format!("reading {:?}", cmd.pdf_path))?;
    let text = extractor
        .extract_text(&bytes)
        .with_context(|| format!("extracting text from {:?}", cmd.pdf_path))?;

    let name = cmd
        .pdf_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let record = aggregator.record_for(&name, &text, &mut NoEvents);
    print!("{}", format_record(&record, &config.not_found));
    Ok(())
}

/// Formats one `field: value` line per field.
fn format_record(record: &Record, not_found: &str) -> String {
    record
        .values()
        .iter()
        .map(|(field, value)| format!("{field}: {}\n", value.or_placeholder(not_found)))
        .collect()
}
