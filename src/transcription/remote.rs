// Remote speech-recognition client
//
// Each turn window is cut from the canonical WAV, re-encoded as a standalone
// WAV body and POSTed to the recognition endpoint. One blocking round trip per
// turn, bounded by the configured request timeout; no retry or backoff.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use serde::Deserialize;

use super::{TimeWindow, Transcribe};
use crate::audio;
use crate::config::RecognitionConfig;
use crate::error::{PipelineError, PipelineResult};

/// Response body of the recognition service. An empty alternatives list means
/// the service recognized no intelligible speech.
#[derive(Debug, Deserialize)]
pub struct RecognitionResponse {
    #[serde(default)]
    pub alternatives: Vec<RecognitionAlternative>,
}

#[derive(Debug, Deserialize)]
pub struct RecognitionAlternative {
    pub transcript: String,
    #[serde(default)]
    pub confidence: f32,
}

impl RecognitionResponse {
    /// Best transcript, or empty string for "no speech detected".
    pub fn best_transcript(&self) -> String {
        self.alternatives
            .first()
            .map(|alt| alt.transcript.trim().to_string())
            .unwrap_or_default()
    }
}

pub struct RemoteRecognizer {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl RemoteRecognizer {
    pub fn new(config: &RecognitionConfig) -> PipelineResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| {
                PipelineError::RecognitionService(format!("failed to build http client: {}", e))
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl Transcribe for RemoteRecognizer {
    async fn transcribe(&self, audio_path: &Path, window: TimeWindow) -> PipelineResult<String> {
        let (samples, sample_rate) = audio::read_wav_window(audio_path, window.start, window.end)?;
        if samples.is_empty() {
            debug!(
                "Window {:.2}s-{:.2}s has no samples, skipping request",
                window.start, window.end
            );
            return Ok(String::new());
        }

        let body = audio::wav_bytes(&samples, sample_rate)?;
        debug!(
            "Sending {:.2}s window ({} bytes) to recognition service",
            window.duration(),
            body.len()
        );

        let mut request = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "audio/wav")
            .body(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            PipelineError::RecognitionService(format!(
                "request for window {:.2}s-{:.2}s failed: {}",
                window.start, window.end, e
            ))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::RecognitionService(format!(
                "service returned {} for window {:.2}s-{:.2}s",
                status, window.start, window.end
            )));
        }

        let parsed: RecognitionResponse = response.json().await.map_err(|e| {
            PipelineError::RecognitionService(format!("malformed response: {}", e))
        })?;

        let transcript = parsed.best_transcript();
        if transcript.is_empty() {
            info!(
                "No speech recognized in window {:.2}s-{:.2}s",
                window.start, window.end
            );
        }
        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_alternatives_is_empty_transcript() {
        let response: RecognitionResponse = serde_json::from_str(r#"{"alternatives": []}"#).unwrap();
        assert_eq!(response.best_transcript(), "");
    }

    #[test]
    fn test_missing_alternatives_field() {
        let response: RecognitionResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response.best_transcript(), "");
    }

    #[test]
    fn test_best_transcript_takes_first_and_trims() {
        let response: RecognitionResponse = serde_json::from_str(
            r#"{"alternatives": [
                {"transcript": "  hello there ", "confidence": 0.93},
                {"transcript": "hollow here", "confidence": 0.41}
            ]}"#,
        )
        .unwrap();
        assert_eq!(response.best_transcript(), "hello there");
    }

    #[test]
    fn test_window_duration() {
        assert_eq!(TimeWindow::new(1.0, 3.5).duration(), 2.5);
        assert_eq!(TimeWindow::new(3.0, 1.0).duration(), 0.0);
    }
}
