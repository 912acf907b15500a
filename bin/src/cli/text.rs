use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use extraction::{aggregate::TextExtractor, pdftext::PdfTextExtractor};

/// Prints the text extracted from a single PDF, as searched by the field
/// patterns.
#[derive(Args, Debug)]
pub struct Command {
    /// Path to the input PDF.
    pdf_path: PathBuf,
}

/// Runs the subcommand.
pub fn run(cmd: &Command) -> Result<()> {
    let bytes =
        std::fs::read(&cmd.pdf_path).with_context(|| format!("reading {:?}", cmd.pdf_path))?;
    let text = PdfTextExtractor::new()
        .extract_text(&bytes)
        .with_context(|| format!("extracting text from {:?}", cmd.pdf_path))?;
    print!("{text}");
    Ok(())
}
