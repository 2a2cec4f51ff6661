//! POST /rank_resumes, POST /api/classify
//!
//! Pipeline per request: parse form → ingest uploads into a scratch dir →
//! extract text → score → rank. The scratch dir lives only as long as the
//! blocking ingestion task and is removed on every exit path.

use std::path::Path;

use anyhow::Context;
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tempfile::TempDir;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::documents::collect::collect_texts;
use crate::documents::ingest::ingest_uploads;
use crate::documents::{ExtractedText, UploadedFile};
use crate::errors::AppError;
use crate::scoring::ranking::rank;
use crate::scoring::{ScoredResume, ScoringRequest};
use crate::state::AppState;

const DEFAULT_TOP_K: usize = 5;
const PREVIEW_CHARS: usize = 200;
/// Largest accepted `min_experience`, in years.
const MAX_MIN_EXPERIENCE: u32 = 100;

/// Validated ranking request.
#[derive(Debug)]
pub struct RankForm {
    pub scoring: ScoringRequest,
    pub files: Vec<UploadedFile>,
    pub top_k: usize,
}

#[derive(Debug, Serialize)]
pub struct RankResponse {
    pub job_circular_preview: String,
    pub skills_searched: Option<Vec<String>>,
    pub min_experience_searched: Option<u32>,
    pub total_resumes: usize,
    pub processed_resumes: usize,
    pub top_k: usize,
    pub scoring_mode: &'static str,
    pub ranked_resumes: Vec<ScoredResume>,
}

pub async fn handle_rank(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<RankResponse>, AppError> {
    let form = RankForm::from_multipart(multipart).await?;

    let span = info_span!(
        "rank",
        request_id = %Uuid::new_v4(),
        mode = state.scorer.mode().as_str()
    );
    rank_resumes(&state, form).instrument(span).await.map(Json)
}

async fn rank_resumes(state: &AppState, form: RankForm) -> Result<RankResponse, AppError> {
    let RankForm {
        scoring,
        files,
        top_k,
    } = form;

    info!("Processing {} uploaded file(s)", files.len());
    let scratch = create_scratch_dir(state.config.scratch_dir.as_deref())?;
    let (total_resumes, texts) = tokio::task::spawn_blocking(move || ingest_and_extract(scratch, &files))
        .await
        .context("Ingestion task failed")??;
    info!(
        "Found {total_resumes} resume file(s), extracted text from {}",
        texts.len()
    );

    if texts.is_empty() {
        return Err(AppError::NoExtractableText);
    }

    let scored = state.scorer.score(&scoring, &texts).await?;
    let ranked_resumes = rank(scored, top_k);

    Ok(RankResponse {
        job_circular_preview: preview(&scoring.job_circular),
        skills_searched: (!scoring.skills.is_empty()).then(|| scoring.skills.clone()),
        min_experience_searched: (scoring.min_experience > 0).then_some(scoring.min_experience),
        total_resumes,
        processed_resumes: texts.len(),
        top_k,
        scoring_mode: state.scorer.mode().as_str(),
        ranked_resumes,
    })
}

/// Runs on the blocking pool and owns the scratch dir, so the directory is
/// deleted when this returns even if the request future was dropped.
fn ingest_and_extract(
    scratch: TempDir,
    files: &[UploadedFile],
) -> Result<(usize, Vec<ExtractedText>), AppError> {
    let resolved = ingest_uploads(files, scratch.path())?;
    let texts = collect_texts(&resolved);
    if let Err(e) = scratch.close() {
        tracing::warn!("Failed to remove scratch directory: {e}");
    }
    Ok((resolved.len(), texts))
}

fn create_scratch_dir(parent: Option<&Path>) -> Result<TempDir, AppError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("resume-ranker-");
    let dir = match parent {
        Some(parent) => builder.tempdir_in(parent),
        None => builder.tempdir(),
    };
    Ok(dir.context("Failed to create scratch directory")?)
}

/// First 200 characters, with an ellipsis when truncated.
pub fn preview(job_circular: &str) -> String {
    match job_circular.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &job_circular[..cut]),
        None => job_circular.to_string(),
    }
}

/// Comma-separated skills, trimmed, empties dropped.
pub fn parse_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl RankForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut job_circular: Option<String> = None;
        let mut files = Vec::new();
        let mut top_k: Option<String> = None;
        let mut skills: Option<String> = None;
        let mut min_experience: Option<String> = None;

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "job_circular" => job_circular = Some(field.text().await.map_err(multipart_error)?),
                "resume_files" => {
                    let filename = field.file_name().unwrap_or_default().to_string();
                    let bytes = field.bytes().await.map_err(multipart_error)?;
                    if filename.trim().is_empty() {
                        return Err(AppError::Validation(
                            "Every resume_files part needs a file name".to_string(),
                        ));
                    }
                    files.push(UploadedFile::new(filename, bytes));
                }
                "top_k" => top_k = Some(field.text().await.map_err(multipart_error)?),
                "skills" => skills = Some(field.text().await.map_err(multipart_error)?),
                "min_experience" => {
                    min_experience = Some(field.text().await.map_err(multipart_error)?)
                }
                _ => {}
            }
        }

        Self::from_fields(job_circular, files, top_k, skills, min_experience)
    }

    /// Applies defaults and validation to the raw form fields.
    pub fn from_fields(
        job_circular: Option<String>,
        files: Vec<UploadedFile>,
        top_k: Option<String>,
        skills: Option<String>,
        min_experience: Option<String>,
    ) -> Result<Self, AppError> {
        let job_circular = job_circular
            .filter(|j| !j.trim().is_empty())
            .ok_or_else(|| AppError::Validation("job_circular is required".to_string()))?;

        if files.is_empty() {
            return Err(AppError::Validation(
                "At least one resume file is required".to_string(),
            ));
        }

        let top_k = match blank_to_none(top_k) {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|k| *k >= 1)
                .ok_or_else(|| {
                    AppError::Validation(format!("top_k must be an integer >= 1, got '{raw}'"))
                })?,
            None => DEFAULT_TOP_K,
        };

        let min_experience = match blank_to_none(min_experience) {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|years| *years <= MAX_MIN_EXPERIENCE)
                .ok_or_else(|| {
                    AppError::Validation(format!(
                        "min_experience must be an integer between 0 and {MAX_MIN_EXPERIENCE}, got '{raw}'"
                    ))
                })?,
            None => 0,
        };

        Ok(Self {
            scoring: ScoringRequest {
                job_circular,
                skills: skills.as_deref().map(parse_skills).unwrap_or_default(),
                min_experience,
            },
            files,
            top_k,
        })
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::Validation(format!("Malformed multipart body: {}", err.body_text()))
    }
}
