//! ZIP expansion. Keeps only entries that are resumes in a supported format.

use std::fs::File;
use std::path::Path;

use thiserror::Error;
use walkdir::WalkDir;
use zip::ZipArchive;

use crate::documents::{DocumentFormat, ResolvedDocuments};

#[derive(Debug, Error)]
#[error("Error extracting ZIP file {archive}: {source}")]
pub struct ArchiveError {
    pub archive: String,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl ArchiveError {
    fn new(archive: &Path, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            archive: archive
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| archive.display().to_string()),
            source: source.into(),
        }
    }
}

/// Unpacks `zip_path` into `dest_dir` and returns every PDF/DOCX/TXT found in
/// the resulting tree, keyed by bare filename.
///
/// Nested directories are walked; nested archives and other formats are
/// dropped silently. The walk is sorted by name so collisions between
/// same-named entries in different folders resolve deterministically
/// (the last one walked wins).
pub fn expand_archive(zip_path: &Path, dest_dir: &Path) -> Result<ResolvedDocuments, ArchiveError> {
    let file = File::open(zip_path).map_err(|e| ArchiveError::new(zip_path, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| ArchiveError::new(zip_path, e))?;
    archive
        .extract(dest_dir)
        .map_err(|e| ArchiveError::new(zip_path, e))?;

    let mut resumes = ResolvedDocuments::new();
    for entry in WalkDir::new(dest_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| ArchiveError::new(zip_path, e))?;
        if !entry.file_type().is_file() || DocumentFormat::from_path(entry.path()).is_none() {
            continue;
        }
        let filename = entry.file_name().to_string_lossy().into_owned();
        resumes.insert(filename, entry.into_path());
    }

    tracing::debug!(
        "Expanded {} into {} resume(s)",
        zip_path.display(),
        resumes.len()
    );
    Ok(resumes)
}
