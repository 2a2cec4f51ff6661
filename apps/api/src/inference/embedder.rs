//! Embedding client: the single point of entry for text → vector encoding.
//!
//! Speaks three wire protocols: text-embeddings-inference, Ollama and
//! OpenAI-compatible servers. The server hosts the pretrained sentence
//! embedding model; this side only batches texts and validates the replies.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{EmbeddingConfig, EmbeddingProvider};
use crate::inference::{ModelError, ModelInfo};

/// Sentence-embedding models the service is known to work with.
pub const KNOWN_EMBEDDING_MODELS: [(&str, &str); 4] = [
    ("all-MiniLM-L6-v2", "Fast, lightweight model (384-dim)"),
    ("all-mpnet-base-v2", "More accurate, larger model (768-dim)"),
    ("paraphrase-MiniLM-L6-v2", "Good for paraphrase detection (384-dim)"),
    (
        "sentence-transformers/all-roberta-large-v1",
        "High quality (1024-dim)",
    ),
];

/// Encodes texts into fixed-length vectors. One vector per input, same order.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ModelError>;

    fn info(&self) -> ModelInfo;
}

/// HTTP-backed [`Embedder`].
pub struct HttpEmbedder {
    client: Client,
    config: EmbeddingConfig,
    /// Learned from the first successful response.
    dimension: OnceLock<usize>,
}

impl HttpEmbedder {
    pub fn new(config: EmbeddingConfig) -> Result<Self, ModelError> {
        if !KNOWN_EMBEDDING_MODELS
            .iter()
            .any(|(name, _)| *name == config.model)
        {
            warn!(
                "Embedding model '{}' is not in the known model list: {:?}",
                config.model,
                KNOWN_EMBEDDING_MODELS
                    .iter()
                    .map(|(name, _)| *name)
                    .collect::<Vec<_>>()
            );
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            dimension: OnceLock::new(),
        })
    }

    fn batch_size(&self) -> usize {
        match self.config.provider {
            EmbeddingProvider::Tei | EmbeddingProvider::Ollama => 32,
            EmbeddingProvider::OpenAi => 64,
        }
    }

    async fn embed_chunk(&self, chunk: &[String]) -> Result<Vec<Vec<f32>>, ModelError> {
        match self.config.provider {
            EmbeddingProvider::Tei => {
                let url = format!("{}/embed", self.config.base_url);
                let body = TeiEmbedRequest {
                    inputs: chunk,
                    truncate: true,
                };
                self.post_json::<_, Vec<Vec<f32>>>(&url, &body).await
            }
            EmbeddingProvider::Ollama => {
                let url = format!("{}/api/embed", self.config.base_url);
                let body = OllamaEmbedRequest {
                    model: &self.config.model,
                    input: chunk,
                    truncate: true,
                };
                let response: OllamaEmbedResponse = self.post_json(&url, &body).await?;
                Ok(response.embeddings)
            }
            EmbeddingProvider::OpenAi => {
                let url = format!("{}/v1/embeddings", self.config.base_url);
                let body = OpenAiEmbedRequest {
                    model: &self.config.model,
                    input: chunk,
                };
                let response: OpenAiEmbedResponse = self.post_json(&url, &body).await?;
                Ok(response.data.into_iter().map(|d| d.embedding).collect())
            }
        }
    }

    async fn post_json<B, R>(&self, url: &str, body: &B) -> Result<R, ModelError>
    where
        B: Serialize + ?Sized,
        R: for<'de> Deserialize<'de>,
    {
        let mut request = self.client.post(url).json(body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ModelError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<R>().await?)
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ModelError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut embeddings = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size()) {
            let batch = self.embed_chunk(chunk).await?;
            if batch.len() != chunk.len() {
                return Err(ModelError::CountMismatch {
                    expected: chunk.len(),
                    actual: batch.len(),
                });
            }
            embeddings.extend(batch);
        }

        if let Some(first) = embeddings.first() {
            let _ = self.dimension.set(first.len());
        }
        debug!(
            "Embedded {} text(s) via {}",
            texts.len(),
            self.config.provider.as_str()
        );
        Ok(embeddings)
    }

    fn info(&self) -> ModelInfo {
        ModelInfo {
            model_name: self.config.model.clone(),
            model_type: "SentenceTransformer".to_string(),
            backend: Some(self.config.provider.as_str().to_string()),
            embedding_dimension: self.dimension.get().copied(),
            total_categories: None,
            feature_width: None,
        }
    }
}

// ─── Wire types ──────────────────────────────────────────

#[derive(Serialize)]
struct TeiEmbedRequest<'a> {
    inputs: &'a [String],
    truncate: bool,
}

#[derive(Serialize)]
struct OllamaEmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
    truncate: bool,
}

#[derive(Deserialize)]
struct OllamaEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Serialize)]
struct OpenAiEmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct OpenAiEmbedResponse {
    data: Vec<OpenAiEmbedData>,
}

#[derive(Deserialize)]
struct OpenAiEmbedData {
    embedding: Vec<f32>,
}
