//! Extraction of labelled fields from the text of PDF documents, aggregated
//! into one tabular record per document.

pub mod aggregate;
pub mod clock;
pub mod csvout;
pub mod fieldmatch;
pub mod pdftext;
pub mod record;
pub mod source;
