use axum::{extract::State, Json};
use serde_json::{json, Map, Value};

use crate::config::ScoringMode;
use crate::documents::SUPPORTED_FORMATS;
use crate::errors::AppError;
use crate::inference::embedder::KNOWN_EMBEDDING_MODELS;
use crate::state::AppState;

const SAMPLE_CATEGORIES: usize = 10;

/// GET /, GET /api/
pub async fn info_handler(State(state): State<AppState>) -> Json<Value> {
    let mode = state.scorer.mode();
    let description = match mode {
        ScoringMode::Similarity => "Rank resumes by semantic similarity to a job circular",
        ScoringMode::Classification => {
            "Classify resumes into job categories and rank them against a job circular"
        }
    };

    let available_models: Map<String, Value> = KNOWN_EMBEDDING_MODELS
        .iter()
        .map(|(name, about)| (name.to_string(), Value::from(*about)))
        .collect();

    let mut body = json!({
        "name": "Resume Ranker API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": description,
        "scoring_mode": mode.as_str(),
        "model_info": state.scorer.model_info(),
        "endpoints": {
            "POST /rank_resumes": "Rank resumes against a job circular",
            "POST /api/classify": "Rank resumes against a job circular",
            "GET /health": "Health check",
            "GET /api/health": "Health check",
            "GET /api/categories": "List all job categories (classification mode)",
            "GET /": "API info",
            "GET /api/": "API info"
        },
        "supported_formats": SUPPORTED_FORMATS,
        "available_models": available_models,
    });

    if let Some(categories) = state.scorer.categories() {
        body["total_categories"] = json!(categories.len());
        body["sample_categories"] = json!(categories
            .iter()
            .take(SAMPLE_CATEGORIES)
            .collect::<Vec<_>>());
    }

    Json(body)
}

/// GET /api/categories
/// Only meaningful when a classifier is loaded.
pub async fn categories_handler(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let categories = state.scorer.categories().ok_or_else(|| {
        AppError::NotFound("Categories are only available in classification mode".to_string())
    })?;

    Ok(Json(json!({
        "total_categories": categories.len(),
        "categories": categories
    })))
}
