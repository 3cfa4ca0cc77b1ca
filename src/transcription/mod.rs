// Transcription: a provider seam plus the remote speech-recognition client.
//
// "No intelligible speech" is not an error here; it comes back as an empty
// string and the orchestrator decides what to do with it.

pub mod remote;

use std::path::Path;

use async_trait::async_trait;

pub use remote::{RecognitionResponse, RemoteRecognizer};

use crate::error::PipelineResult;

/// A `[start, end)` time range within the canonical audio file, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
}

impl TimeWindow {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// Provider seam for speech-to-text. Returns the transcript for a window of
/// the canonical audio file, or an empty string when the service recognized no
/// speech.
#[async_trait]
pub trait Transcribe: Send + Sync {
    async fn transcribe(&self, audio: &Path, window: TimeWindow) -> PipelineResult<String>;
}
