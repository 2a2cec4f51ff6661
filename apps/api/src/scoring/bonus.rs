//! Keyword-level sub-scores shared by both scoring modes.

use std::collections::HashSet;

/// Weight of the skill component inside the bonus.
pub const SKILL_WEIGHT: f64 = 0.5;
/// Flat award when an experience phrase is found.
pub const EXPERIENCE_AWARD: f64 = 0.3;
/// Years above the minimum that are still probed.
pub const EXPERIENCE_PROBE_SPAN: u32 = 19;

/// `(skills found / skills requested) * 0.5`; 0 when nothing was requested.
/// `resume_lower` must already be lowercased.
pub fn skill_component(resume_lower: &str, skills: &[String]) -> f64 {
    if skills.is_empty() {
        return 0.0;
    }
    let found = skills
        .iter()
        .filter(|skill| resume_lower.contains(&skill.to_lowercase()))
        .count();
    (found as f64 / skills.len() as f64) * SKILL_WEIGHT
}

/// The phrases probed for a minimum of `min_years`, in probe order:
/// `"N years"`, `"N+ years"`, then `"n years"` for `n` in `N+1..=N+19`.
/// The upper probe saturates at `u32::MAX`.
pub fn experience_phrases(min_years: u32) -> Vec<String> {
    let mut phrases = vec![format!("{min_years} years"), format!("{min_years}+ years")];
    if let Some(first) = min_years.checked_add(1) {
        let last = min_years.saturating_add(EXPERIENCE_PROBE_SPAN);
        phrases.extend((first..=last).map(|years| format!("{years} years")));
    }
    phrases
}

/// 0.3 if any probed phrase occurs, else 0. Never cumulative.
/// A minimum of 0 years probes nothing.
pub fn experience_component(resume_lower: &str, min_years: u32) -> f64 {
    if min_years == 0 {
        return 0.0;
    }
    let matched = experience_phrases(min_years)
        .iter()
        .any(|phrase| resume_lower.contains(phrase.as_str()));
    if matched {
        EXPERIENCE_AWARD
    } else {
        0.0
    }
}

/// Skill + experience bonus, clamped to `[0, 1]`.
pub fn skill_experience_bonus(resume_text: &str, skills: &[String], min_years: u32) -> f64 {
    let resume_lower = resume_text.to_lowercase();
    let bonus = skill_component(&resume_lower, skills) + experience_component(&resume_lower, min_years);
    bonus.clamp(0.0, 1.0)
}

/// Share of the job circular's distinct lowercase words that also appear in
/// the resume. 0 when the circular has no words.
pub fn job_relevance(resume_text: &str, job_circular: &str) -> f64 {
    let job_lower = job_circular.to_lowercase();
    let job_words: HashSet<&str> = job_lower.split_whitespace().collect();
    if job_words.is_empty() {
        return 0.0;
    }
    let resume_lower = resume_text.to_lowercase();
    let resume_words: HashSet<&str> = resume_lower.split_whitespace().collect();
    let overlap = job_words.intersection(&resume_words).count();
    overlap as f64 / job_words.len() as f64
}
