use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// Which score composition the process serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringMode {
    /// Embedding cosine similarity + skill/experience bonus.
    Similarity,
    /// Classifier confidence + job relevance + skill/experience bonus.
    Classification,
}

impl ScoringMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringMode::Similarity => "similarity",
            ScoringMode::Classification => "classification",
        }
    }
}

impl FromStr for ScoringMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "similarity" => Ok(ScoringMode::Similarity),
            "classification" => Ok(ScoringMode::Classification),
            other => bail!("Unknown scoring mode '{other}' (expected 'similarity' or 'classification')"),
        }
    }
}

/// Wire protocol of the embedding server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingProvider {
    /// text-embeddings-inference `POST /embed`
    Tei,
    /// Ollama `POST /api/embed`
    Ollama,
    /// OpenAI-compatible `POST /v1/embeddings`
    OpenAi,
}

impl EmbeddingProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbeddingProvider::Tei => "tei",
            EmbeddingProvider::Ollama => "ollama",
            EmbeddingProvider::OpenAi => "openai",
        }
    }
}

impl FromStr for EmbeddingProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "tei" => Ok(EmbeddingProvider::Tei),
            "ollama" => Ok(EmbeddingProvider::Ollama),
            "openai" => Ok(EmbeddingProvider::OpenAi),
            other => bail!("Unknown embedding provider '{other}'"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Tei,
            base_url: "http://localhost:8080".to_string(),
            model: "all-MiniLM-L6-v2".to_string(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub scoring_mode: ScoringMode,
    pub embedding: EmbeddingConfig,
    pub classifier_model_dir: PathBuf,
    pub max_upload_bytes: usize,
    /// Parent of the per-request scratch directories. `None` = system temp dir.
    pub scratch_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            rust_log: "info".to_string(),
            scoring_mode: ScoringMode::Similarity,
            embedding: EmbeddingConfig::default(),
            classifier_model_dir: PathBuf::from("models"),
            max_upload_bytes: 50 * 1024 * 1024,
            scratch_dir: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        let embedding_defaults = EmbeddingConfig::default();

        Ok(Config {
            port: parse_env("PORT", defaults.port)?,
            rust_log: optional_env("RUST_LOG").unwrap_or(defaults.rust_log),
            scoring_mode: parse_env("SCORING_MODE", defaults.scoring_mode)?,
            embedding: EmbeddingConfig {
                provider: parse_env("EMBEDDING_PROVIDER", embedding_defaults.provider)?,
                base_url: optional_env("EMBEDDING_BASE_URL")
                    .map(|u| u.trim_end_matches('/').to_string())
                    .unwrap_or(embedding_defaults.base_url),
                model: optional_env("EMBEDDING_MODEL").unwrap_or(embedding_defaults.model),
                api_key: optional_env("EMBEDDING_API_KEY"),
                timeout_secs: parse_env("EMBEDDING_TIMEOUT_SECS", embedding_defaults.timeout_secs)?,
            },
            classifier_model_dir: optional_env("CLASSIFIER_MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.classifier_model_dir),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            scratch_dir: optional_env("SCRATCH_DIR").map(PathBuf::from),
        })
    }
}

/// Unset and blank variables both count as missing.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
