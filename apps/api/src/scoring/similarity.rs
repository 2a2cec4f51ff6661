//! Embedding-based scorer.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ScoringMode;
use crate::documents::ExtractedText;
use crate::inference::embedder::Embedder;
use crate::inference::{ModelError, ModelInfo};
use crate::scoring::bonus::skill_experience_bonus;
use crate::scoring::{round4, ResumeScorer, ScoredResume, ScoringRequest, SubScores};

pub const SIMILARITY_WEIGHT: f64 = 0.8;
pub const BONUS_WEIGHT: f64 = 0.2;

/// Semantic matching of each resume against the job circular.
///
/// `final = similarity * 0.8 + bonus * 0.2`
pub struct SimilarityScorer {
    embedder: Arc<dyn Embedder>,
}

impl SimilarityScorer {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }
}

#[async_trait]
impl ResumeScorer for SimilarityScorer {
    fn mode(&self) -> ScoringMode {
        ScoringMode::Similarity
    }

    async fn score(
        &self,
        request: &ScoringRequest,
        resumes: &[ExtractedText],
    ) -> Result<Vec<ScoredResume>, ModelError> {
        // Job circular first, then resumes in order, in one batched call.
        let mut inputs = Vec::with_capacity(resumes.len() + 1);
        inputs.push(request.job_circular.clone());
        inputs.extend(resumes.iter().map(|r| r.text.clone()));

        let vectors = self.embedder.embed(&inputs).await?;
        if vectors.len() != inputs.len() {
            return Err(ModelError::CountMismatch {
                expected: inputs.len(),
                actual: vectors.len(),
            });
        }
        let (job_vector, resume_vectors) = vectors.split_at(1);
        let job_vector = &job_vector[0];

        resumes
            .iter()
            .zip(resume_vectors)
            .map(|(resume, vector)| {
                let similarity = cosine_similarity(job_vector, vector)?;
                let bonus = if request.wants_bonus() {
                    skill_experience_bonus(&resume.text, &request.skills, request.min_experience)
                } else {
                    0.0
                };
                let final_score = similarity * SIMILARITY_WEIGHT + bonus * BONUS_WEIGHT;

                Ok(ScoredResume {
                    filename: resume.filename.clone(),
                    scores: SubScores::Similarity {
                        similarity_score: round4(similarity),
                        bonus_score: round4(bonus),
                    },
                    final_score: round4(final_score),
                })
            })
            .collect()
    }

    fn model_info(&self) -> ModelInfo {
        self.embedder.info()
    }
}

/// Dot product over the product of magnitudes. A zero vector has no
/// direction and scores 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, ModelError> {
    if a.len() != b.len() {
        return Err(ModelError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        Ok(0.0)
    } else {
        Ok(dot / denom)
    }
}
