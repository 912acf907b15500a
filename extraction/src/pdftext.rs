//! [TextExtractor] backed by the `pdf-extract` crate.
//!
//! `pdf-extract` can panic on malformed input rather than returning an error,
//! so extraction runs inside [std::panic::catch_unwind] and a panic becomes
//! [TextError::Panicked].

use std::panic::{self, AssertUnwindSafe};

use anyhow::Result;

use crate::aggregate::TextExtractor;

#[derive(Debug, thiserror::Error)]
pub enum TextError {
    #[error("PDF text extraction failed: {0}")]
    Pdf(#[from] pdf_extract::OutputError),
    #[error("PDF parser panicked on a malformed document")]
    Panicked,
}

/// Extracts the text of every page, in page order, each page followed by a
/// newline.
#[derive(Debug, Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String> {
        let pages = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(bytes)
        }))
        .map_err(|_| TextError::Panicked)?
        .map_err(TextError::Pdf)?;

        Ok(join_pages(&pages))
    }
}

fn join_pages(pages: &[String]) -> String {
    let mut text = String::with_capacity(pages.iter().map(|page| page.len() + 1).sum());
    for page in pages {
        text.push_str(page);
        text.push('\n');
    }
    text
}
