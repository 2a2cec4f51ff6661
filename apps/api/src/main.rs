use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use resume_ranker::config::{Config, ScoringMode};
use resume_ranker::inference::classifier::{DocumentClassifier, LinearClassifier};
use resume_ranker::inference::embedder::HttpEmbedder;
use resume_ranker::routes::build_router;
use resume_ranker::scoring::{ClassificationScorer, ResumeScorer, SimilarityScorer};
use resume_ranker::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("resume_ranker={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Ranker API v{}", env!("CARGO_PKG_VERSION"));

    // Load the model once; it is shared read-only by every request
    let scorer = build_scorer(&config)?;
    info!(
        "Scoring mode: {} (model: {})",
        config.scoring_mode.as_str(),
        scorer.model_info().model_name
    );

    let state = AppState::new(config.clone(), scorer);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_scorer(config: &Config) -> Result<Arc<dyn ResumeScorer>> {
    let scorer: Arc<dyn ResumeScorer> = match config.scoring_mode {
        ScoringMode::Similarity => {
            let embedder = HttpEmbedder::new(config.embedding.clone())?;
            info!(
                "Embedding backend: {} at {}",
                config.embedding.provider.as_str(),
                config.embedding.base_url
            );
            Arc::new(SimilarityScorer::new(Arc::new(embedder)))
        }
        ScoringMode::Classification => {
            let classifier = LinearClassifier::load(&config.classifier_model_dir)?;
            info!(
                "Classifier loaded: {} categories, {} features",
                classifier.categories().len(),
                classifier.feature_width()
            );
            Arc::new(ClassificationScorer::new(Arc::new(classifier)))
        }
    };
    Ok(scorer)
}
