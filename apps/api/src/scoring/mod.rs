//! Resume scoring: pluggable, trait-based scorers that blend sub-scores
//! into one final score per resume.
//!
//! `SimilarityScorer`: embedding cosine similarity + skill/experience bonus.
//! `ClassificationScorer`: classifier confidence + job relevance + bonus.
//!
//! `AppState` holds an `Arc<dyn ResumeScorer>`, chosen at startup via config.

use async_trait::async_trait;
use serde::Serialize;

use crate::config::ScoringMode;
use crate::documents::ExtractedText;
use crate::inference::classifier::CategoryProbability;
use crate::inference::{ModelError, ModelInfo};

pub mod bonus;
pub mod classification;
pub mod ranking;
pub mod similarity;

pub use classification::ClassificationScorer;
pub use similarity::SimilarityScorer;

/// What each resume is scored against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoringRequest {
    pub job_circular: String,
    pub skills: Vec<String>,
    pub min_experience: u32,
}

impl ScoringRequest {
    /// The skill/experience bonus only applies when something was asked for.
    pub fn wants_bonus(&self) -> bool {
        !self.skills.is_empty() || self.min_experience > 0
    }
}

/// Mode-specific sub-scores, all rounded to 4 decimals.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum SubScores {
    Similarity {
        similarity_score: f64,
        bonus_score: f64,
    },
    Classification {
        predicted_category: String,
        confidence: f64,
        job_relevance: f64,
        skill_bonus: f64,
        top_categories: Vec<CategoryProbability>,
    },
}

/// One resume's scores as returned to the client.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScoredResume {
    pub filename: String,
    #[serde(flatten)]
    pub scores: SubScores,
    pub final_score: f64,
}

/// The scorer trait. Implement this to swap scoring backends without
/// touching the handler.
#[async_trait]
pub trait ResumeScorer: Send + Sync {
    fn mode(&self) -> ScoringMode;

    /// Scores every resume, preserving input order.
    async fn score(
        &self,
        request: &ScoringRequest,
        resumes: &[ExtractedText],
    ) -> Result<Vec<ScoredResume>, ModelError>;

    fn model_info(&self) -> ModelInfo;

    /// Category list, for scorers backed by a classifier.
    fn categories(&self) -> Option<&[String]> {
        None
    }
}

/// Rounds to 4 decimal places.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round4() {
        assert_eq!(round4(0.123456), 0.1235);
        assert_eq!(round4(0.55), 0.55);
        assert_eq!(round4(1.0), 1.0);
        assert_eq!(round4(0.0), 0.0);
    }

    #[test]
    fn test_wants_bonus() {
        let mut request = ScoringRequest::default();
        assert!(!request.wants_bonus());
        request.min_experience = 1;
        assert!(request.wants_bonus());
        request.min_experience = 0;
        request.skills = vec!["rust".to_string()];
        assert!(request.wants_bonus());
    }

    #[test]
    fn test_scored_resume_serializes_flat() {
        let scored = ScoredResume {
            filename: "a.pdf".to_string(),
            scores: SubScores::Similarity {
                similarity_score: 0.5,
                bonus_score: 0.25,
            },
            final_score: 0.45,
        };
        assert_eq!(
            serde_json::to_value(&scored).unwrap(),
            serde_json::json!({
                "filename": "a.pdf",
                "similarity_score": 0.5,
                "bonus_score": 0.25,
                "final_score": 0.45
            })
        );
    }
}
