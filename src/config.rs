// Pipeline configuration
//
// One section per stage, defaults that work out of the box, environment
// overrides for endpoints and credentials. Secrets (HF_TOKEN,
// RECOGNITION_API_KEY) are only ever read from the environment and are never
// logged.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};

/// What the orchestrator does with a turn whose transcription came back empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyTranscriptPolicy {
    /// Skip the turn entirely (behavior of the original pipeline).
    Drop,
    /// Emit a record with empty transcription and no sentiment.
    EmitEmpty,
}

impl Default for EmptyTranscriptPolicy {
    fn default() -> Self {
        EmptyTranscriptPolicy::Drop
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Canonical sample rate the whole pipeline runs at.
    pub target_sample_rate: u32,
    /// Fixed location of the normalized WAV. Overwritten on every run, so
    /// concurrent invocations against the same working directory are not safe.
    pub canonical_path: PathBuf,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: 16_000,
            canonical_path: PathBuf::from("converted_audio.wav"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiarizationConfig {
    /// Directory holding the ONNX models. `None` resolves to the user cache
    /// dir.
    pub models_dir: Option<PathBuf>,
    pub segmentation_model_url: String,
    pub embedding_model_url: String,
    /// Maximum number of speakers to track per session.
    pub max_speakers: usize,
    /// Similarity threshold for speaker clustering (0.0 to 1.0).
    pub similarity_threshold: f32,
}

impl Default for DiarizationConfig {
    fn default() -> Self {
        Self {
            models_dir: None,
            segmentation_model_url:
                "https://github.com/thewh1teagle/pyannote-rs/releases/download/v0.1.0/segmentation-3.0.onnx"
                    .to_string(),
            embedding_model_url:
                "https://github.com/thewh1teagle/pyannote-rs/releases/download/v0.1.0/wespeaker_en_voxceleb_CAM++.onnx"
                    .to_string(),
            max_speakers: 10,
            similarity_threshold: 0.85,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionConfig {
    /// Speech-recognition HTTP endpoint. The request body is a standalone WAV
    /// of the turn window.
    pub endpoint: String,
    /// Bearer token for the service. Populated from RECOGNITION_API_KEY, never
    /// from source.
    #[serde(skip_serializing, default)]
    pub api_key: Option<String>,
    /// Hard timeout per request; a hung service call fails the turn instead of
    /// hanging the pipeline.
    pub request_timeout_secs: u64,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8080/v1/recognize".to_string(),
            api_key: None,
            request_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentConfig {
    pub models_dir: Option<PathBuf>,
    pub model_url: String,
    pub tokenizer_url: String,
    /// Class labels in the model's output order.
    pub labels: Vec<String>,
    /// How many labels to return per transcript, best first.
    pub top_k: usize,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            models_dir: None,
            model_url:
                "https://huggingface.co/Xenova/distilbert-base-uncased-finetuned-sst-2-english/resolve/main/onnx/model.onnx"
                    .to_string(),
            tokenizer_url:
                "https://huggingface.co/Xenova/distilbert-base-uncased-finetuned-sst-2-english/resolve/main/tokenizer.json"
                    .to_string(),
            labels: vec!["NEGATIVE".to_string(), "POSITIVE".to_string()],
            top_k: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Upper bound on concurrent transcribe+classify tasks. 1 reproduces
    /// strictly sequential processing; output order is preserved either way.
    pub worker_count: usize,
    pub empty_transcript_policy: EmptyTranscriptPolicy,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            worker_count: 4,
            empty_transcript_policy: EmptyTranscriptPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub audio: AudioConfig,
    pub diarization: DiarizationConfig,
    pub recognition: RecognitionConfig,
    pub sentiment: SentimentConfig,
    pub orchestrator: OrchestratorConfig,
}

impl PipelineConfig {
    /// Defaults plus environment overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(endpoint) = env::var("RECOGNITION_API_URL") {
            if !endpoint.is_empty() {
                config.recognition.endpoint = endpoint;
            }
        }
        config.recognition.api_key =
            env::var("RECOGNITION_API_KEY").ok().filter(|k| !k.is_empty());

        if let Ok(dir) = env::var("VOICE_SENTIMENT_MODELS_DIR") {
            if !dir.is_empty() {
                let dir = PathBuf::from(dir);
                config.diarization.models_dir = Some(dir.clone());
                config.sentiment.models_dir = Some(dir);
            }
        }

        if let Ok(workers) = env::var("VOICE_SENTIMENT_WORKERS") {
            if let Ok(n) = workers.parse::<usize>() {
                config.orchestrator.worker_count = n;
            }
        }

        config
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if self.audio.target_sample_rate == 0 {
            return Err(PipelineError::Config(
                "target sample rate cannot be 0".to_string(),
            ));
        }
        if self.recognition.endpoint.is_empty() {
            return Err(PipelineError::Config(
                "recognition endpoint cannot be empty".to_string(),
            ));
        }
        if self.recognition.request_timeout_secs == 0 {
            return Err(PipelineError::Config(
                "recognition timeout cannot be 0".to_string(),
            ));
        }
        if self.orchestrator.worker_count == 0 {
            return Err(PipelineError::Config(
                "worker count must be at least 1".to_string(),
            ));
        }
        if self.sentiment.top_k == 0 {
            return Err(PipelineError::Config(
                "sentiment top_k must be at least 1".to_string(),
            ));
        }
        if self.sentiment.labels.is_empty() {
            return Err(PipelineError::Config(
                "sentiment labels cannot be empty".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.diarization.similarity_threshold) {
            return Err(PipelineError::Config(
                "similarity threshold must be within 0.0..=1.0".to_string(),
            ));
        }
        if self.diarization.max_speakers == 0 {
            return Err(PipelineError::Config(
                "max speakers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.audio.target_sample_rate, 16_000);
        assert_eq!(
            config.orchestrator.empty_transcript_policy,
            EmptyTranscriptPolicy::Drop
        );
    }

    #[test]
    fn test_validation_rejects_zero_workers() {
        let mut config = PipelineConfig::default();
        config.orchestrator.worker_count = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_threshold() {
        let mut config = PipelineConfig::default();
        config.diarization.similarity_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        env::set_var("RECOGNITION_API_URL", "https://stt.example/v1/listen");
        env::set_var("VOICE_SENTIMENT_WORKERS", "2");
        let config = PipelineConfig::from_env();
        env::remove_var("RECOGNITION_API_URL");
        env::remove_var("VOICE_SENTIMENT_WORKERS");

        assert_eq!(config.recognition.endpoint, "https://stt.example/v1/listen");
        assert_eq!(config.orchestrator.worker_count, 2);
    }
}
