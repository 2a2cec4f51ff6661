//! Writes uploads to the request's scratch directory and resolves the
//! resumes they contain.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::documents::archive::{expand_archive, ArchiveError};
use crate::documents::{is_zip, DocumentFormat, ResolvedDocuments, UploadedFile};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Unsupported file format: {filename}")]
    UnsupportedFormat { filename: String },

    #[error("Invalid upload filename: {0:?}")]
    InvalidFilename(String),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("Failed to write upload {filename}: {source}")]
    Io {
        filename: String,
        #[source]
        source: std::io::Error,
    },
}

/// Materializes every upload under `dest_dir` and returns the resolved
/// `filename → path` map.
///
/// - `.pdf` / `.docx` / `.txt` are added directly.
/// - `.zip` is unpacked into its own subdirectory and its resumes merged in,
///   overwriting earlier entries with the same filename.
/// - Anything else aborts the whole ingestion.
pub fn ingest_uploads(
    files: &[UploadedFile],
    dest_dir: &Path,
) -> Result<ResolvedDocuments, IngestError> {
    let mut resumes = ResolvedDocuments::new();

    for (index, upload) in files.iter().enumerate() {
        let filename = base_name(&upload.filename)?;
        let path = dest_dir.join(&filename);
        std::fs::write(&path, &upload.bytes).map_err(|source| IngestError::Io {
            filename: filename.clone(),
            source,
        })?;

        if is_zip(&path) {
            let unpack_dir = dest_dir.join(format!("zip-{index}"));
            resumes.extend(expand_archive(&path, &unpack_dir)?);
        } else if DocumentFormat::from_path(&path).is_some() {
            resumes.insert(filename, path);
        } else {
            return Err(IngestError::UnsupportedFormat { filename });
        }
    }

    Ok(resumes)
}

/// Strips any client-supplied directory components. Both separators are
/// handled since browsers on Windows may send full paths.
fn base_name(filename: &str) -> Result<String, IngestError> {
    let last = filename.rsplit(['/', '\\']).next().unwrap_or_default();
    let name = PathBuf::from(last)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if name.is_empty() {
        return Err(IngestError::InvalidFilename(filename.to_string()));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::archive::tests::zip_bytes;
    use tempfile::TempDir;

    #[test]
    fn test_direct_uploads_are_resolved_in_order() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            UploadedFile::new("b.txt", "second"),
            UploadedFile::new("a.pdf", "%PDF"),
        ];

        let resumes = ingest_uploads(&files, dir.path()).unwrap();
        assert_eq!(resumes.filenames(), vec!["b.txt", "a.pdf"]);
        assert_eq!(
            std::fs::read_to_string(resumes.get("b.txt").unwrap()).unwrap(),
            "second"
        );
    }

    #[test]
    fn test_zip_with_two_pdfs_and_exe_yields_two() {
        let dir = TempDir::new().unwrap();
        let zip = zip_bytes(&[
            ("one.pdf", b"%PDF"),
            ("two.pdf", b"%PDF"),
            ("tool.exe", b"MZ"),
        ]);
        let files = vec![UploadedFile::new("batch.zip", zip)];

        let resumes = ingest_uploads(&files, dir.path()).unwrap();
        assert_eq!(resumes.len(), 2);
    }

    #[test]
    fn test_direct_unsupported_upload_aborts() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            UploadedFile::new("ok.txt", "fine"),
            UploadedFile::new("photo.png", vec![0u8; 4]),
        ];

        match ingest_uploads(&files, dir.path()) {
            Err(IngestError::UnsupportedFormat { filename }) => assert_eq!(filename, "photo.png"),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
    }

    #[test]
    fn test_zip_entry_overwrites_direct_upload() {
        let dir = TempDir::new().unwrap();
        let zip = zip_bytes(&[("cv.txt", b"from zip")]);
        let files = vec![
            UploadedFile::new("cv.txt", "direct"),
            UploadedFile::new("other.txt", "other"),
            UploadedFile::new("bundle.zip", zip),
        ];

        let resumes = ingest_uploads(&files, dir.path()).unwrap();
        assert_eq!(resumes.filenames(), vec!["cv.txt", "other.txt"]);
        assert_eq!(
            std::fs::read_to_string(resumes.get("cv.txt").unwrap()).unwrap(),
            "from zip"
        );
    }

    #[test]
    fn test_corrupt_zip_aborts() {
        let dir = TempDir::new().unwrap();
        let files = vec![UploadedFile::new("bad.zip", "nope")];

        let err = ingest_uploads(&files, dir.path()).unwrap_err();
        assert!(matches!(err, IngestError::Archive(_)));
    }

    #[test]
    fn test_client_paths_are_reduced_to_base_name() {
        assert_eq!(base_name("../../etc/cv.txt").unwrap(), "cv.txt");
        assert_eq!(base_name(r"C:\Users\me\cv.docx").unwrap(), "cv.docx");
        assert!(matches!(
            base_name("uploads/"),
            Err(IngestError::InvalidFilename(_))
        ));
        assert!(base_name("..").is_err());
    }
}
