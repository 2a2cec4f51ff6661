//! Classifier input schema.
//!
//! Layout version 1, in this exact order:
//!
//! | block        | width              | source                                   |
//! |--------------|--------------------|------------------------------------------|
//! | TF-IDF       | `vocabulary.len()` | vocabulary index order                   |
//! | skill flags  | `skills.len()`     | 1.0 if the skill occurs in the text      |
//! | text stats   | 4                  | chars, words, mean word length, uniq/all |
//!
//! The scaler and weight matrix in the model artifact are fitted against this
//! layout; any change to it must bump [`FEATURE_LAYOUT_VERSION`].

use std::collections::{HashMap, HashSet};

use serde::Deserialize;

pub const FEATURE_LAYOUT_VERSION: u32 = 1;
pub const TEXT_STAT_FEATURES: usize = 4;

/// Pretrained TF-IDF vectorizer: lowercase, tokens of two or more word
/// characters, raw counts (or `1 + ln(count)` when sublinear) times idf,
/// L2-normalized.
#[derive(Debug, Clone, Deserialize)]
pub struct TfidfVectorizer {
    pub vocabulary: HashMap<String, usize>,
    pub idf: Vec<f64>,
    #[serde(default)]
    pub sublinear_tf: bool,
}

impl TfidfVectorizer {
    pub fn width(&self) -> usize {
        self.idf.len()
    }

    /// Every term must map to a distinct in-range column.
    pub fn validate(&self) -> Result<(), String> {
        if self.vocabulary.len() != self.idf.len() {
            return Err(format!(
                "vocabulary has {} terms but idf has {} weights",
                self.vocabulary.len(),
                self.idf.len()
            ));
        }
        let mut seen = HashSet::with_capacity(self.vocabulary.len());
        for (term, &index) in &self.vocabulary {
            if index >= self.idf.len() || !seen.insert(index) {
                return Err(format!("term '{term}' has invalid column {index}"));
            }
        }
        Ok(())
    }

    pub fn transform(&self, text: &str) -> Vec<f64> {
        let lower = text.to_lowercase();
        let mut row = vec![0.0_f64; self.width()];
        for token in tokenize(&lower) {
            if let Some(&index) = self.vocabulary.get(token) {
                row[index] += 1.0;
            }
        }

        for (index, value) in row.iter_mut().enumerate() {
            if *value > 0.0 {
                let tf = if self.sublinear_tf {
                    1.0 + value.ln()
                } else {
                    *value
                };
                *value = tf * self.idf[index];
            }
        }

        let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            row.iter_mut().for_each(|v| *v /= norm);
        }
        row
    }
}

/// Word-character runs of length ≥ 2.
fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| t.chars().count() >= 2)
}

/// Whole-document statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStats {
    pub char_count: f64,
    /// Whitespace-split word count, floored at 1 so ratios never divide by zero.
    pub word_count: f64,
    /// 0 for an empty document.
    pub avg_word_length: f64,
    /// Distinct (case-insensitive) words over `word_count`; 0 for an empty document.
    pub unique_word_ratio: f64,
}

impl TextStats {
    pub fn from_text(text: &str) -> Self {
        let words: Vec<&str> = text.split_whitespace().collect();
        let word_count = words.len().max(1) as f64;
        let avg_word_length = if words.is_empty() {
            0.0
        } else {
            words.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / words.len() as f64
        };
        let unique: HashSet<String> = words.iter().map(|w| w.to_lowercase()).collect();

        Self {
            char_count: text.chars().count() as f64,
            word_count,
            avg_word_length,
            unique_word_ratio: unique.len() as f64 / word_count,
        }
    }

    pub fn to_array(self) -> [f64; TEXT_STAT_FEATURES] {
        [
            self.char_count,
            self.word_count,
            self.avg_word_length,
            self.unique_word_ratio,
        ]
    }
}

/// One resume's unscaled features, split by block.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub tfidf: Vec<f64>,
    pub skill_flags: Vec<f64>,
    pub stats: TextStats,
}

impl FeatureVector {
    pub fn width(&self) -> usize {
        self.tfidf.len() + self.skill_flags.len() + TEXT_STAT_FEATURES
    }

    /// Flattens into layout order.
    pub fn into_values(self) -> Vec<f64> {
        let mut values = self.tfidf;
        values.extend(self.skill_flags);
        values.extend(self.stats.to_array());
        values
    }
}

/// Builds [`FeatureVector`]s from raw resume text.
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    pub vectorizer: TfidfVectorizer,
    /// Stored lowercased.
    pub skills: Vec<String>,
}

impl FeatureSchema {
    pub fn new(vectorizer: TfidfVectorizer, skills: Vec<String>) -> Self {
        Self {
            vectorizer,
            skills: skills.into_iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.vectorizer.width() + self.skills.len() + TEXT_STAT_FEATURES
    }

    pub fn build(&self, text: &str) -> FeatureVector {
        let lower = text.to_lowercase();
        FeatureVector {
            tfidf: self.vectorizer.transform(text),
            skill_flags: self
                .skills
                .iter()
                .map(|skill| if lower.contains(skill.as_str()) { 1.0 } else { 0.0 })
                .collect(),
            stats: TextStats::from_text(text),
        }
    }
}
