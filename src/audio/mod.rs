// Audio normalizer: decode anything ffmpeg can read, resample to the
// canonical rate, and write the fixed-location 16-bit PCM mono WAV the rest of
// the pipeline works from.

pub mod decode;
pub mod resample;
pub mod wav;

use std::path::{Path, PathBuf};

use log::info;

use crate::config::AudioConfig;
use crate::error::PipelineResult;

pub use decode::{decode_audio_file, DECODE_SAMPLE_RATE};
pub use resample::resample;
pub use wav::{read_wav, read_wav_window, wav_bytes, write_wav};

/// Produce the canonical WAV for an input file. The output path is taken from
/// the config and overwritten if present.
pub fn normalize_audio(input: &Path, config: &AudioConfig) -> PipelineResult<PathBuf> {
    let samples = decode::decode_audio_file(input)?;
    let resampled = resample::resample(&samples, DECODE_SAMPLE_RATE, config.target_sample_rate)?;
    wav::write_wav(&config.canonical_path, &resampled, config.target_sample_rate)?;

    info!(
        "Normalized {} -> {} ({:.2}s at {} Hz)",
        input.display(),
        config.canonical_path.display(),
        resampled.len() as f64 / config.target_sample_rate as f64,
        config.target_sample_rate
    );
    Ok(config.canonical_path.clone())
}
