// Speaker diarization: pyannote segmentation + embedding clustering, with the
// engine held as a process-wide singleton so models load once and are reused
// across runs.

pub mod engine;
pub mod model_manager;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use once_cell::sync::Lazy;
use tokio::sync::RwLock;

pub use engine::{DiarizationEngine, Turn};
pub use model_manager::{
    ensure_models, model_paths, EMBEDDING_MODEL_NAME, SEGMENTATION_MODEL_NAME,
};

use crate::audio;
use crate::config::DiarizationConfig;
use crate::error::PipelineResult;

/// Global diarization engine instance, loaded on first use.
pub static DIARIZATION_ENGINE: Lazy<Arc<RwLock<Option<DiarizationEngine>>>> =
    Lazy::new(|| Arc::new(RwLock::new(None)));

/// Load the engine into the global slot, fetching models if needed. Idempotent.
pub async fn init_diarization_engine(config: &DiarizationConfig) -> PipelineResult<()> {
    {
        let guard = DIARIZATION_ENGINE.read().await;
        if guard.is_some() {
            debug!("Diarization engine already initialized");
            return Ok(());
        }
    }

    let paths = model_manager::ensure_models(config).await?;
    let engine = DiarizationEngine::new(config.clone(), paths)?;

    let mut guard = DIARIZATION_ENGINE.write().await;
    if guard.is_none() {
        *guard = Some(engine);
    }
    Ok(())
}

/// Diarize a canonical WAV file using the global engine, initializing it on
/// first call. Session speaker state is reset per file.
pub async fn diarize_file(path: &Path, config: &DiarizationConfig) -> PipelineResult<Vec<Turn>> {
    init_diarization_engine(config).await?;

    let (samples, sample_rate) = audio::read_wav(path)?;

    let mut guard = DIARIZATION_ENGINE.write().await;
    let engine = guard.as_mut().ok_or_else(|| {
        crate::error::PipelineError::ModelLoad("diarization engine not initialized".to_string())
    })?;
    engine.reset_session();
    engine.diarize(&samples, sample_rate)
}

/// Seam for the orchestrator: the production impl wraps the global pyannote
/// engine, tests substitute deterministic fakes.
#[async_trait]
pub trait Diarize: Send + Sync {
    async fn diarize(&self, audio: &Path) -> PipelineResult<Vec<Turn>>;
}

pub struct PyannoteDiarizer {
    config: DiarizationConfig,
}

impl PyannoteDiarizer {
    pub fn new(config: DiarizationConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Diarize for PyannoteDiarizer {
    async fn diarize(&self, audio: &Path) -> PipelineResult<Vec<Turn>> {
        diarize_file(audio, &self.config).await
    }
}
