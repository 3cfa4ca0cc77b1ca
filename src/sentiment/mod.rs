// Sentiment classification: local ONNX text-classification model, loaded once
// per process and shared behind an Arc. The original pipeline reloaded the
// model on every call; loading is hoisted to process scope here.

pub mod classifier;
pub mod model_manager;

use std::sync::Arc;

use log::debug;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

pub use classifier::SentimentClassifier;
pub use model_manager::{ensure_models, model_paths, SENTIMENT_MODEL_NAME, TOKENIZER_NAME};

use crate::config::SentimentConfig;
use crate::error::PipelineResult;

/// One sentiment label with its confidence, part of a top-k ordered list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: String,
    pub score: f32,
}

/// Seam for the orchestrator. `classify` is only ever called with non-empty
/// text and returns at least one label on success.
pub trait Classify: Send + Sync {
    fn classify(&self, text: &str) -> PipelineResult<Vec<Sentiment>>;
}

/// Global classifier instance, loaded on first use.
static SENTIMENT_CLASSIFIER: Lazy<RwLock<Option<Arc<SentimentClassifier>>>> =
    Lazy::new(|| RwLock::new(None));

/// Fetch model files if needed and return the shared classifier, loading it on
/// first call.
pub async fn get_or_init_classifier(
    config: &SentimentConfig,
) -> PipelineResult<Arc<SentimentClassifier>> {
    {
        let guard = SENTIMENT_CLASSIFIER.read().await;
        if let Some(classifier) = guard.as_ref() {
            debug!("Sentiment classifier already initialized");
            return Ok(classifier.clone());
        }
    }

    let paths = model_manager::ensure_models(config).await?;
    let classifier = Arc::new(SentimentClassifier::new(
        &paths.model,
        &paths.tokenizer,
        config.labels.clone(),
        config.top_k,
    )?);

    let mut guard = SENTIMENT_CLASSIFIER.write().await;
    Ok(guard.get_or_insert(classifier).clone())
}
