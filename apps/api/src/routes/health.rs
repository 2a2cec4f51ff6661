use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health, GET /api/health
/// Process status plus metadata about the loaded model.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "scoring_mode": state.scorer.mode().as_str(),
        "model_info": state.scorer.model_info(),
        "started_at": state.started_at,
        "message": "Resume Ranker API is running"
    }))
}
