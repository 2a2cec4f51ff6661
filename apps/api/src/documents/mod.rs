//! Document ingestion. Materializes uploads, unpacks archives and extracts plain text.
//!
//! Flow per request:
//! `UploadedFile`s → [`ingest::ingest_uploads`] → `ResolvedDocuments`
//! → [`collect::collect_texts`] → `Vec<ExtractedText>`.
//!
//! Everything here is blocking file I/O. Callers on the async runtime run it
//! inside `tokio::task::spawn_blocking`.

use std::path::{Path, PathBuf};

use bytes::Bytes;

pub mod archive;
pub mod collect;
pub mod extract;
pub mod ingest;

/// Resume formats that can be scored directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
}

impl DocumentFormat {
    /// Resolves a format from a file path by its lowercased extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match extension_of(path).as_deref() {
            Some("pdf") => Some(Self::Pdf),
            Some("docx") => Some(Self::Docx),
            Some("txt") => Some(Self::Txt),
            _ => None,
        }
    }
}

/// Upload formats advertised by the API.
pub const SUPPORTED_FORMATS: [&str; 4] = ["PDF", "DOCX", "TXT", "ZIP"];

/// Lowercased extension without the leading dot.
pub(crate) fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

pub(crate) fn is_zip(path: &Path) -> bool {
    extension_of(path).as_deref() == Some("zip")
}

/// A file part received from the client. Dropped once written to scratch storage.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// One supported document discovered during ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDocument {
    pub filename: String,
    pub path: PathBuf,
}

/// Insertion-ordered `filename → path` map.
///
/// Re-inserting a filename replaces its path but keeps the original position,
/// so ranking ties stay deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedDocuments {
    entries: Vec<ResolvedDocument>,
}

impl ResolvedDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, filename: String, path: PathBuf) {
        match self.entries.iter_mut().find(|d| d.filename == filename) {
            Some(existing) => existing.path = path,
            None => self.entries.push(ResolvedDocument { filename, path }),
        }
    }

    /// Merges `other` into `self`; entries from `other` win on collision.
    pub fn extend(&mut self, other: ResolvedDocuments) {
        for doc in other.entries {
            self.insert(doc.filename, doc.path);
        }
    }

    pub fn get(&self, filename: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|d| d.filename == filename)
            .map(|d| d.path.as_path())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedDocument> {
        self.entries.iter()
    }

    pub fn filenames(&self) -> Vec<&str> {
        self.entries.iter().map(|d| d.filename.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Plain text of one resume, keyed by its filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub filename: String,
    pub text: String,
}
