//! Enumerates the PDF documents directly within a source directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

/// Reasons that a source directory cannot be listed at all.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum SourceError {
    #[error("source folder does not exist")]
    Missing,
    #[error("source path is not a directory")]
    NotADirectory,
}

/// Name and content of a single input document.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Document {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// A document that could not be turned into text.
#[derive(Debug, thiserror::Error)]
#[error("could not read document {name:?}")]
pub struct DocumentError {
    pub name: String,
    #[source]
    pub source: anyhow::Error,
}

/// PDF files found directly within a directory, ordered by file name.
#[derive(Debug)]
pub struct DirSource {
    paths: Vec<PathBuf>,
}

impl DirSource {
    /// Lists the PDF files in `dir`. Subdirectories are not descended into.
    pub fn open(dir: &Path) -> Result<Self> {
        match std::fs::metadata(dir) {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => return Err(anyhow!(SourceError::NotADirectory)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(anyhow!(SourceError::Missing));
            }
            Err(err) => return Err(anyhow!(err)),
        }

        let mut paths = Vec::new();
        for dir_entry in walkdir::WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let dir_entry = dir_entry.with_context(|| format!("listing {:?}", dir))?;
            let is_pdf = dir_entry.file_type().is_file()
                && is_pdf_name(&dir_entry.file_name().to_string_lossy());
            if is_pdf {
                paths.push(dir_entry.into_path());
            }
        }

        Ok(Self { paths })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Reads each document in turn, only holding one in memory at a time.
    pub fn documents(&self) -> impl Iterator<Item = Result<Document, DocumentError>> + '_ {
        self.paths.iter().map(|path| read_document(path))
    }
}

/// Returns `true` if `name` has a PDF extension, ignoring case.
pub fn is_pdf_name(name: &str) -> bool {
    name.to_lowercase().ends_with(".pdf")
}

fn read_document(path: &Path) -> Result<Document, DocumentError> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());
    match std::fs::read(path) {
        Ok(bytes) => Ok(Document { name, bytes }),
        Err(err) => Err(DocumentError {
            name,
            source: anyhow!(err).context(format!("reading {:?}", path)),
        }),
    }
}
