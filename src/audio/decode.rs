// Audio decoding via ffmpeg
//
// Any container/codec ffmpeg understands is decoded to mono f32 PCM piped
// through stdout. ffmpeg is located on PATH first, then through the sidecar
// cache, and auto-downloaded as a last resort.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, error, info};

use crate::error::{PipelineError, PipelineResult};

/// Fixed intermediate rate for decoding. The sinc resampler owns the
/// conversion down to the canonical pipeline rate.
pub const DECODE_SAMPLE_RATE: u32 = 48_000;

fn find_ffmpeg() -> Option<PathBuf> {
    if let Ok(path) = which::which("ffmpeg") {
        return Some(path);
    }
    let sidecar = ffmpeg_sidecar::paths::ffmpeg_path();
    if sidecar.exists() {
        return Some(sidecar);
    }
    None
}

fn ensure_ffmpeg() -> PipelineResult<PathBuf> {
    if let Some(path) = find_ffmpeg() {
        return Ok(path);
    }

    info!("ffmpeg not found, downloading sidecar binary");
    ffmpeg_sidecar::download::auto_download()
        .map_err(|e| PipelineError::Decode(format!("ffmpeg unavailable: {}", e)))?;

    let path = ffmpeg_sidecar::paths::ffmpeg_path();
    if path.exists() {
        Ok(path)
    } else {
        Err(PipelineError::Decode(
            "ffmpeg unavailable after download".to_string(),
        ))
    }
}

/// Decode an audio file to mono f32 samples at `DECODE_SAMPLE_RATE`.
pub fn decode_audio_file(input: &Path) -> PipelineResult<Vec<f32>> {
    if !input.exists() {
        return Err(PipelineError::Decode(format!(
            "input file does not exist: {}",
            input.display()
        )));
    }

    let ffmpeg_path = ensure_ffmpeg()?;
    info!("Decoding audio file: {}", input.display());
    debug!("Using ffmpeg at: {:?}", ffmpeg_path);

    let mut command = Command::new(&ffmpeg_path);
    command
        .arg("-i")
        .arg(input)
        .arg("-f")
        .arg("f32le")
        .arg("-acodec")
        .arg("pcm_f32le")
        .arg("-ar")
        .arg(DECODE_SAMPLE_RATE.to_string())
        .arg("-ac")
        .arg("1")
        .arg("-")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command
        .spawn()
        .map_err(|e| PipelineError::Decode(format!("failed to spawn ffmpeg: {}", e)))?;

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| PipelineError::Decode("failed to capture ffmpeg stdout".to_string()))?;

    let mut raw_bytes = Vec::new();
    stdout.read_to_end(&mut raw_bytes)?;

    let output = child.wait_with_output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!("ffmpeg decode failed: {}", stderr.trim());
        return Err(PipelineError::Decode(format!(
            "ffmpeg could not decode {}: {}",
            input.display(),
            last_stderr_line(&stderr)
        )));
    }

    if raw_bytes.len() % 4 != 0 {
        return Err(PipelineError::Decode(format!(
            "invalid pcm stream length: {} bytes",
            raw_bytes.len()
        )));
    }

    let samples: Vec<f32> = raw_bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    if samples.is_empty() {
        return Err(PipelineError::Decode(format!(
            "no audio stream in {}",
            input.display()
        )));
    }

    info!(
        "Decoded {} samples ({:.2}s) from {}",
        samples.len(),
        samples.len() as f64 / DECODE_SAMPLE_RATE as f64,
        input.display()
    );

    Ok(samples)
}

fn last_stderr_line(stderr: &str) -> &str {
    stderr.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("unknown error")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input_is_decode_error() {
        let err = decode_audio_file(Path::new("does-not-exist.mp3")).unwrap_err();
        assert!(matches!(err, PipelineError::Decode(_)));
    }

    #[test]
    fn test_last_stderr_line_skips_blanks() {
        let stderr = "header\nInvalid data found\n\n";
        assert_eq!(last_stderr_line(stderr), "Invalid data found");
    }
}
