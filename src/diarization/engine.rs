// Diarization engine built on pyannote-rs: segmentation splits the audio into
// speech segments, speaker embeddings cluster the segments into per-session
// speakers ("Speaker 1", "Speaker 2", ...).

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use log::{info, warn};
use pyannote_rs::{get_segments, EmbeddingExtractor, EmbeddingManager};
use serde::{Deserialize, Serialize};

use super::model_manager::DiarizationModelPaths;
use crate::config::DiarizationConfig;
use crate::error::{PipelineError, PipelineResult};

/// One contiguous speaker turn, ordered by start time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Start time in seconds.
    pub start_time: f64,
    /// End time in seconds.
    pub end_time: f64,
    /// Internal speaker id (e.g. "speaker_0").
    pub speaker_id: String,
    /// Display label (e.g. "Speaker 1").
    pub speaker_label: String,
}

pub struct DiarizationEngine {
    config: DiarizationConfig,
    paths: DiarizationModelPaths,
    embedding_extractor: EmbeddingExtractor,
    embedding_manager: EmbeddingManager,
    /// Session-scoped map from speaker id to display label.
    speaker_labels: HashMap<String, String>,
}

impl DiarizationEngine {
    /// Build an engine from already-downloaded model files.
    pub fn new(config: DiarizationConfig, paths: DiarizationModelPaths) -> PipelineResult<Self> {
        Self::try_new(config, paths).map_err(|e| PipelineError::ModelLoad(e.to_string()))
    }

    fn try_new(config: DiarizationConfig, paths: DiarizationModelPaths) -> Result<Self> {
        info!("Initializing diarization engine");

        if !paths.segmentation.exists() {
            return Err(anyhow!(
                "segmentation model not found: {:?}",
                paths.segmentation
            ));
        }
        if !paths.embedding.exists() {
            return Err(anyhow!("embedding model not found: {:?}", paths.embedding));
        }

        // pyannote-rs reports errors through eyre, convert at the boundary
        let embedding_extractor = EmbeddingExtractor::new(&paths.embedding)
            .map_err(|e| anyhow!("failed to create embedding extractor: {}", e))?;
        let embedding_manager = EmbeddingManager::new(config.max_speakers);

        info!("Diarization engine ready");
        Ok(Self {
            config,
            paths,
            embedding_extractor,
            embedding_manager,
            speaker_labels: HashMap::new(),
        })
    }

    /// Run diarization over i16 mono samples. Turns come back sorted by start
    /// time; gaps and overlaps are whatever the model produced.
    pub fn diarize(&mut self, samples: &[i16], sample_rate: u32) -> PipelineResult<Vec<Turn>> {
        info!(
            "Running diarization on {} samples at {} Hz",
            samples.len(),
            sample_rate
        );

        let segments_iter = get_segments(samples, sample_rate, &self.paths.segmentation)
            .map_err(|e| PipelineError::ModelLoad(format!("segmentation failed: {}", e)))?;

        let mut turns = Vec::new();
        for segment_result in segments_iter {
            let segment = match segment_result {
                Ok(seg) => seg,
                Err(e) => {
                    warn!("Skipping unprocessable segment: {}", e);
                    continue;
                }
            };

            let embedding: Vec<f32> = match self.embedding_extractor.compute(&segment.samples) {
                Ok(iter) => iter.collect(),
                Err(e) => {
                    warn!("Failed to compute embedding for segment: {}", e);
                    continue;
                }
            };

            let (speaker_id, speaker_label) = self.identify_speaker(&embedding);
            turns.push(Turn {
                start_time: segment.start,
                end_time: segment.end,
                speaker_id,
                speaker_label,
            });
        }

        turns.sort_by(|a, b| {
            a.start_time
                .partial_cmp(&b.start_time)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        info!(
            "Diarization complete: {} turns from {} speakers",
            turns.len(),
            self.speaker_labels.len()
        );
        Ok(turns)
    }

    fn identify_speaker(&mut self, embedding: &[f32]) -> (String, String) {
        if let Some(speaker_idx) = self
            .embedding_manager
            .search_speaker(embedding.to_vec(), self.config.similarity_threshold)
        {
            let speaker_id = format!("speaker_{}", speaker_idx);
            let label = self
                .speaker_labels
                .entry(speaker_id.clone())
                .or_insert_with(|| format!("Speaker {}", speaker_idx + 1))
                .clone();
            return (speaker_id, label);
        }

        warn!(
            "Max speakers ({}) reached, turn assigned to 'Unknown'",
            self.config.max_speakers
        );
        ("unknown".to_string(), "Unknown".to_string())
    }

    /// Drop session speaker state before processing a new file.
    pub fn reset_session(&mut self) {
        self.speaker_labels.clear();
        self.embedding_manager = EmbeddingManager::new(self.config.max_speakers);
    }
}
