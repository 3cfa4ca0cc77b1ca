// Diarization model files: resolved under the model cache dir and fetched on
// first use. A fetch or load failure is fatal for the run; there is no retry.

use std::path::PathBuf;

use crate::config::DiarizationConfig;
use crate::error::PipelineResult;
use crate::models;

pub const SEGMENTATION_MODEL_NAME: &str = "segmentation-3.0.onnx";
pub const EMBEDDING_MODEL_NAME: &str = "wespeaker_en_voxceleb_CAM++.onnx";

/// Resolved on-disk locations of the two diarization models.
#[derive(Debug, Clone)]
pub struct DiarizationModelPaths {
    pub segmentation: PathBuf,
    pub embedding: PathBuf,
}

pub fn model_paths(config: &DiarizationConfig) -> PipelineResult<DiarizationModelPaths> {
    let dir = models::resolve_models_dir(config.models_dir.as_deref())?;
    Ok(DiarizationModelPaths {
        segmentation: dir.join(SEGMENTATION_MODEL_NAME),
        embedding: dir.join(EMBEDDING_MODEL_NAME),
    })
}

/// Download both models if they are not cached yet.
pub async fn ensure_models(config: &DiarizationConfig) -> PipelineResult<DiarizationModelPaths> {
    let paths = model_paths(config)?;
    models::ensure_file(&config.segmentation_model_url, &paths.segmentation).await?;
    models::ensure_file(&config.embedding_model_url, &paths.embedding).await?;
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_paths_use_configured_dir() {
        let mut config = DiarizationConfig::default();
        config.models_dir = Some(PathBuf::from("/tmp/models"));
        let paths = model_paths(&config).unwrap();
        assert_eq!(
            paths.segmentation,
            PathBuf::from("/tmp/models").join(SEGMENTATION_MODEL_NAME)
        );
        assert_eq!(
            paths.embedding,
            PathBuf::from("/tmp/models").join(EMBEDDING_MODEL_NAME)
        );
    }
}
