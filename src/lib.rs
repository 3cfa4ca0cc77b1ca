// voice-sentiment - speaker-diarized sentiment analysis for audio files
//
// Pipeline stages:
// - audio: decode + resample to a canonical 16 kHz mono WAV
// - diarization: pyannote-based speaker turns
// - transcription: remote speech-recognition service, one request per turn
// - sentiment: local ONNX text classifier
// - pipeline: orchestration with a bounded, order-preserving worker pool

pub mod audio;
pub mod config;
pub mod diarization;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod sentiment;
pub mod transcription;

pub use config::{EmptyTranscriptPolicy, PipelineConfig};
pub use diarization::Turn;
pub use error::{PipelineError, PipelineResult};
pub use pipeline::{AnalysisRecord, Pipeline};
pub use sentiment::Sentiment;
