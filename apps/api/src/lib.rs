//! # resume-ranker
//!
//! HTTP service that scores uploaded resumes (PDF, DOCX, TXT, or ZIP bundles
//! of those) against a job circular and returns the top-K.
//!
//! Two scoring modes, selected at startup:
//!
//! - **similarity**: cosine similarity of sentence embeddings, plus a
//!   skill/experience bonus (`0.8 * similarity + 0.2 * bonus`).
//! - **classification**: category confidence from a pretrained classifier,
//!   keyword overlap with the circular, plus the same bonus
//!   (`0.5 * confidence + 0.3 * relevance + 0.2 * bonus`).
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration
//! - [`documents`] - Upload ingestion, ZIP expansion, text extraction
//! - [`inference`] - Embedding client and classifier (the pretrained models)
//! - [`scoring`] - Sub-scores, score blending and ranking
//! - [`routes`] - Axum HTTP handlers
//! - [`state`] - Shared read-only application state

pub mod config;
pub mod documents;
pub mod errors;
pub mod inference;
pub mod routes;
pub mod scoring;
pub mod state;
