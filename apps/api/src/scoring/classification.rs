//! Classifier-based scorer.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ScoringMode;
use crate::documents::ExtractedText;
use crate::inference::classifier::{CategoryProbability, DocumentClassifier};
use crate::inference::{ModelError, ModelInfo};
use crate::scoring::bonus::{job_relevance, skill_experience_bonus};
use crate::scoring::{round4, ResumeScorer, ScoredResume, ScoringRequest, SubScores};

pub const CONFIDENCE_WEIGHT: f64 = 0.5;
pub const RELEVANCE_WEIGHT: f64 = 0.3;
pub const BONUS_WEIGHT: f64 = 0.2;
/// Categories echoed per resume.
pub const TOP_CATEGORIES: usize = 5;

/// Category prediction plus keyword relevance.
///
/// `final = confidence * 0.5 + job_relevance * 0.3 + bonus * 0.2`
pub struct ClassificationScorer {
    classifier: Arc<dyn DocumentClassifier>,
}

impl ClassificationScorer {
    pub fn new(classifier: Arc<dyn DocumentClassifier>) -> Self {
        Self { classifier }
    }
}

#[async_trait]
impl ResumeScorer for ClassificationScorer {
    fn mode(&self) -> ScoringMode {
        ScoringMode::Classification
    }

    /// Inference is CPU-bound and runs on the blocking pool.
    async fn score(
        &self,
        request: &ScoringRequest,
        resumes: &[ExtractedText],
    ) -> Result<Vec<ScoredResume>, ModelError> {
        let classifier = Arc::clone(&self.classifier);
        let request = request.clone();
        let resumes = resumes.to_vec();

        tokio::task::spawn_blocking(move || score_batch(classifier.as_ref(), &request, &resumes))
            .await
            .map_err(|e| ModelError::Inference(format!("Classification task failed: {e}")))?
    }

    fn model_info(&self) -> ModelInfo {
        self.classifier.info()
    }

    fn categories(&self) -> Option<&[String]> {
        Some(self.classifier.categories())
    }
}

fn score_batch(
    classifier: &dyn DocumentClassifier,
    request: &ScoringRequest,
    resumes: &[ExtractedText],
) -> Result<Vec<ScoredResume>, ModelError> {
    resumes
        .iter()
        .map(|resume| {
            let prediction = classifier.predict(&resume.text)?;
            let relevance = job_relevance(&resume.text, &request.job_circular);
            let bonus = if request.wants_bonus() {
                skill_experience_bonus(&resume.text, &request.skills, request.min_experience)
            } else {
                0.0
            };
            let final_score = prediction.confidence * CONFIDENCE_WEIGHT
                + relevance * RELEVANCE_WEIGHT
                + bonus * BONUS_WEIGHT;

            let top_categories = prediction
                .distribution
                .iter()
                .take(TOP_CATEGORIES)
                .map(|c| CategoryProbability {
                    category: c.category.clone(),
                    probability: round4(c.probability),
                })
                .collect();

            Ok(ScoredResume {
                filename: resume.filename.clone(),
                scores: SubScores::Classification {
                    predicted_category: prediction.category,
                    confidence: round4(prediction.confidence),
                    job_relevance: round4(relevance),
                    skill_bonus: round4(bonus),
                    top_categories,
                },
                final_score: round4(final_score),
            })
        })
        .collect()
}
