//! Resume category classifier.
//!
//! [`LinearClassifier`] loads a pretrained multinomial linear model from
//! `classifier.json`. The artifact carries everything inference needs: the
//! TF-IDF vectorizer, the skill vocabulary, the standard scaler and the
//! per-category weights.

use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::inference::features::{FeatureSchema, TfidfVectorizer, FEATURE_LAYOUT_VERSION};
use crate::inference::{ModelError, ModelInfo};

pub const CLASSIFIER_ARTIFACT: &str = "classifier.json";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryProbability {
    pub category: String,
    pub probability: f64,
}

/// Output of a single classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Argmax category.
    pub category: String,
    /// Probability of `category`.
    pub confidence: f64,
    /// Every category, most probable first.
    pub distribution: Vec<CategoryProbability>,
}

pub trait DocumentClassifier: Send + Sync {
    fn predict(&self, text: &str) -> Result<Prediction, ModelError>;

    /// The fixed category list, in model output order.
    fn categories(&self) -> &[String];

    fn info(&self) -> ModelInfo;
}

#[derive(Debug, Clone, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Zero-variance columns carry a scale of 0 in some exports; they are left unscaled.
    fn transform(&self, values: &mut [f64]) {
        for ((value, mean), scale) in values.iter_mut().zip(&self.mean).zip(&self.scale) {
            let scale = if *scale == 0.0 { 1.0 } else { *scale };
            *value = (*value - mean) / scale;
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierArtifact {
    pub model_name: String,
    #[serde(default = "default_model_type")]
    pub model_type: String,
    pub layout_version: u32,
    pub categories: Vec<String>,
    pub skills: Vec<String>,
    pub vectorizer: TfidfVectorizer,
    pub scaler: StandardScaler,
    /// One row per category, each `feature_width` wide.
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

fn default_model_type() -> String {
    "LinearClassifier".to_string()
}

pub struct LinearClassifier {
    model_name: String,
    model_type: String,
    categories: Vec<String>,
    schema: FeatureSchema,
    scaler: StandardScaler,
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
}

impl LinearClassifier {
    /// Loads `<model_dir>/classifier.json`.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let path = model_dir.join(CLASSIFIER_ARTIFACT);
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read classifier artifact {}", path.display()))?;
        let artifact: ClassifierArtifact = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse classifier artifact {}", path.display()))?;
        Self::from_artifact(artifact)
    }

    /// Validates every dimension against the feature layout before accepting the model.
    pub fn from_artifact(artifact: ClassifierArtifact) -> Result<Self> {
        ensure!(
            artifact.layout_version == FEATURE_LAYOUT_VERSION,
            "Classifier was trained on feature layout v{}, this build produces v{}",
            artifact.layout_version,
            FEATURE_LAYOUT_VERSION
        );
        ensure!(!artifact.categories.is_empty(), "Classifier has no categories");
        artifact
            .vectorizer
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid vectorizer: {e}"))?;

        let schema = FeatureSchema::new(artifact.vectorizer, artifact.skills);
        let width = schema.width();
        ensure!(
            artifact.scaler.mean.len() == width && artifact.scaler.scale.len() == width,
            "Scaler covers {} features, layout has {width}",
            artifact.scaler.mean.len()
        );
        ensure!(
            artifact.weights.len() == artifact.categories.len()
                && artifact.bias.len() == artifact.categories.len(),
            "Weights/bias do not match the {} categories",
            artifact.categories.len()
        );
        ensure!(
            artifact.weights.iter().all(|row| row.len() == width),
            "Weight rows must be {width} wide"
        );

        Ok(Self {
            model_name: artifact.model_name,
            model_type: artifact.model_type,
            categories: artifact.categories,
            schema,
            scaler: artifact.scaler,
            weights: artifact.weights,
            bias: artifact.bias,
        })
    }

    pub fn feature_width(&self) -> usize {
        self.schema.width()
    }
}

impl DocumentClassifier for LinearClassifier {
    fn predict(&self, text: &str) -> Result<Prediction, ModelError> {
        let features = self.schema.build(text);
        if features.width() != self.feature_width() {
            return Err(ModelError::DimensionMismatch {
                expected: self.feature_width(),
                actual: features.width(),
            });
        }

        let mut values = features.into_values();
        self.scaler.transform(&mut values);

        let logits: Vec<f64> = self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(row, bias)| row.iter().zip(&values).map(|(w, x)| w * x).sum::<f64>() + bias)
            .collect();
        let probabilities = softmax(&logits)?;

        let mut distribution: Vec<CategoryProbability> = self
            .categories
            .iter()
            .zip(probabilities)
            .map(|(category, probability)| CategoryProbability {
                category: category.clone(),
                probability,
            })
            .collect();
        distribution.sort_by(|a, b| b.probability.total_cmp(&a.probability));

        let top = distribution
            .first()
            .ok_or_else(|| ModelError::Inference("empty distribution".to_string()))?;

        Ok(Prediction {
            category: top.category.clone(),
            confidence: top.probability,
            distribution,
        })
    }

    fn categories(&self) -> &[String] {
        &self.categories
    }

    fn info(&self) -> ModelInfo {
        ModelInfo {
            model_name: self.model_name.clone(),
            model_type: self.model_type.clone(),
            backend: None,
            embedding_dimension: None,
            total_categories: Some(self.categories.len()),
            feature_width: Some(self.feature_width()),
        }
    }
}

fn softmax(logits: &[f64]) -> Result<Vec<f64>, ModelError> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return Err(ModelError::Inference("non-finite classifier output".to_string()));
    }
    let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    Ok(exps.into_iter().map(|e| e / sum).collect())
}
