//! Batch text extraction over the resolved resumes.

use tracing::warn;

use crate::documents::extract::extract_text;
use crate::documents::{ExtractedText, ResolvedDocuments};

/// Extracts text from every resolved resume, in resolution order.
///
/// A file that fails extraction is logged and left out; this never fails.
/// An empty result is for the caller to reject.
pub fn collect_texts(resumes: &ResolvedDocuments) -> Vec<ExtractedText> {
    resumes
        .iter()
        .filter_map(|doc| match extract_text(&doc.path) {
            Ok(text) => Some(ExtractedText {
                filename: doc.filename.clone(),
                text,
            }),
            Err(e) => {
                warn!("Could not extract text from {}: {e}", doc.filename);
                None
            }
        })
        .collect()
}
