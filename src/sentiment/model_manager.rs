// Sentiment model files, cached next to the diarization models.

use std::path::PathBuf;

use crate::config::SentimentConfig;
use crate::error::PipelineResult;
use crate::models;

pub const SENTIMENT_MODEL_NAME: &str = "sentiment.onnx";
pub const TOKENIZER_NAME: &str = "sentiment-tokenizer.json";

#[derive(Debug, Clone)]
pub struct SentimentModelPaths {
    pub model: PathBuf,
    pub tokenizer: PathBuf,
}

pub fn model_paths(config: &SentimentConfig) -> PipelineResult<SentimentModelPaths> {
    let dir = models::resolve_models_dir(config.models_dir.as_deref())?;
    Ok(SentimentModelPaths {
        model: dir.join(SENTIMENT_MODEL_NAME),
        tokenizer: dir.join(TOKENIZER_NAME),
    })
}

pub async fn ensure_models(config: &SentimentConfig) -> PipelineResult<SentimentModelPaths> {
    let paths = model_paths(config)?;
    models::ensure_file(&config.model_url, &paths.model).await?;
    models::ensure_file(&config.tokenizer_url, &paths.tokenizer).await?;
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_paths_use_configured_dir() {
        let mut config = SentimentConfig::default();
        config.models_dir = Some(PathBuf::from("/tmp/models"));
        let paths = model_paths(&config).unwrap();
        assert_eq!(
            paths.model,
            PathBuf::from("/tmp/models").join(SENTIMENT_MODEL_NAME)
        );
    }
}
