// Pipeline error taxonomy
//
// Unrecognized speech is NOT an error: the transcriber maps it to an empty
// string and the orchestrator applies its empty-transcript policy. Everything
// here aborts the run.

use std::fmt;

#[derive(Debug)]
pub enum PipelineError {
    /// Input audio could not be decoded (unsupported format, corrupt file,
    /// missing ffmpeg).
    Decode(String),
    /// A pretrained model (diarization or sentiment) could not be fetched or
    /// loaded.
    ModelLoad(String),
    /// The remote speech-recognition service failed (network, HTTP status,
    /// malformed response). Distinct from "no speech detected".
    RecognitionService(String),
    /// Sentiment inference failed on a non-empty transcript.
    Classification(String),
    /// Invalid configuration value.
    Config(String),
    Io(std::io::Error),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Decode(msg) => write!(f, "audio decode failed: {}", msg),
            PipelineError::ModelLoad(msg) => write!(f, "model load failed: {}", msg),
            PipelineError::RecognitionService(msg) => {
                write!(f, "recognition service error: {}", msg)
            }
            PipelineError::Classification(msg) => {
                write!(f, "sentiment classification failed: {}", msg)
            }
            PipelineError::Config(msg) => write!(f, "invalid configuration: {}", msg),
            PipelineError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::Io(err)
    }
}

/// WAV read/write problems surface while producing or slicing the canonical
/// audio file, so they count as decode failures.
impl From<hound::Error> for PipelineError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(io) => PipelineError::Io(io),
            other => PipelineError::Decode(other.to_string()),
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_detail() {
        let err = PipelineError::RecognitionService("status 503".to_string());
        let msg = err.to_string();
        assert!(msg.contains("recognition service"));
        assert!(msg.contains("503"));
    }

    #[test]
    fn test_hound_io_maps_to_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: PipelineError = hound::Error::IoError(io).into();
        assert!(matches!(err, PipelineError::Io(_)));
    }
}
