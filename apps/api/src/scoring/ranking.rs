//! Top-K ordering of scored resumes.

use crate::scoring::ScoredResume;

/// Orders results by `final_score`, highest first, and keeps the first `top_k`.
///
/// The sort is stable: equal scores keep their input order. A `top_k` larger
/// than the population returns everything.
pub fn rank(mut results: Vec<ScoredResume>, top_k: usize) -> Vec<ScoredResume> {
    results.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
    results.truncate(top_k);
    results
}
