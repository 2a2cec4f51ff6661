//! Pretrained model capabilities used by the scorers.
//!
//! The models themselves are external: an embedding server reached over HTTP,
//! or a linear classifier exported to a JSON artifact. Both are constructed
//! once at startup and shared read-only behind `Arc<dyn ...>`.

use serde::Serialize;
use thiserror::Error;

pub mod classifier;
pub mod embedder;
pub mod features;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Model returned {actual} outputs for {expected} inputs")]
    CountMismatch { expected: usize, actual: usize },

    #[error("Vector has dimension {actual}, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Inference failed: {0}")]
    Inference(String),
}

/// Metadata about the loaded model, reported by the health and info endpoints.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModelInfo {
    pub model_name: String,
    pub model_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_dimension: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_categories: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_width: Option<usize>,
}
