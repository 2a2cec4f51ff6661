//! Plain-text extraction for PDF, DOCX and TXT resumes.

use std::fs::File;
use std::io::Read;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;
use zip::ZipArchive;

use crate::documents::DocumentFormat;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main body part of a WordprocessingML package.
const DOCX_BODY_PART: &str = "word/document.xml";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file format: {filename}")]
    UnsupportedFormat { filename: String },

    #[error("Error extracting text from {filename}: {source}")]
    Extraction {
        filename: String,
        #[source]
        source: BoxError,
    },
}

impl ExtractError {
    fn extraction(path: &Path, source: impl Into<BoxError>) -> Self {
        ExtractError::Extraction {
            filename: path.display().to_string(),
            source: source.into(),
        }
    }
}

/// Extracts plain text from a resume file, dispatching on its extension.
/// The result is trimmed of surrounding whitespace.
pub fn extract_text(path: &Path) -> Result<String, ExtractError> {
    let format =
        DocumentFormat::from_path(path).ok_or_else(|| ExtractError::UnsupportedFormat {
            filename: path.display().to_string(),
        })?;

    let text = match format {
        DocumentFormat::Pdf => extract_pdf(path),
        DocumentFormat::Docx => extract_docx(path),
        DocumentFormat::Txt => extract_txt(path),
    }
    .map_err(|e| ExtractError::extraction(path, e))?;

    Ok(text.trim().to_string())
}

/// Page text in document order. pdf-extract can panic on malformed input,
/// so the panic is turned into an error for this one file.
fn extract_pdf(path: &Path) -> Result<String, BoxError> {
    let bytes = std::fs::read(path)?;
    match panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(&bytes)
    })) {
        Ok(result) => Ok(result?),
        Err(_) => Err("PDF parser panicked on malformed input".into()),
    }
}

fn extract_docx(path: &Path) -> Result<String, BoxError> {
    let mut archive = ZipArchive::new(File::open(path)?)?;
    let mut xml = String::new();
    archive.by_name(DOCX_BODY_PART)?.read_to_string(&mut xml)?;
    Ok(docx_paragraphs(&xml)?)
}

/// Invalid UTF-8 sequences are replaced, never rejected.
fn extract_txt(path: &Path) -> Result<String, BoxError> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Concatenates body-level paragraphs of a `word/document.xml`, each followed
/// by a newline. Paragraphs inside tables are not part of the body sequence.
fn docx_paragraphs(xml: &str) -> Result<String, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut paragraph = String::new();
    let mut paragraph_depth = 0usize;
    let mut table_depth = 0usize;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => {
                    paragraph_depth += 1;
                    if paragraph_depth == 1 {
                        paragraph.clear();
                    }
                }
                b"w:tbl" => table_depth += 1,
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:p" => {
                    if paragraph_depth == 1 && table_depth == 0 {
                        out.push_str(&paragraph);
                        out.push('\n');
                    }
                    paragraph_depth = paragraph_depth.saturating_sub(1);
                }
                b"w:tbl" => table_depth = table_depth.saturating_sub(1),
                b"w:t" => in_text = false,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:p" if paragraph_depth == 0 && table_depth == 0 => out.push('\n'),
                b"w:tab" if paragraph_depth == 1 => paragraph.push('\t'),
                b"w:br" | b"w:cr" if paragraph_depth == 1 => paragraph.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text && paragraph_depth == 1 => {
                paragraph.push_str(&t.unescape()?);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out)
}
