// Canonical WAV I/O
//
// The normalized file is 16-bit PCM mono. Turn windows are sliced out of it
// by sample index and re-encoded as standalone WAV bodies for the recognition
// service.

use std::io::Cursor;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::{PipelineError, PipelineResult};

fn pcm16_spec(sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

fn f32_to_i16(sample: f32) -> i16 {
    (sample * 32767.0).clamp(-32768.0, 32767.0) as i16
}

/// Write mono f32 samples as a 16-bit PCM WAV file, overwriting any existing
/// file at `path`.
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> PipelineResult<()> {
    let mut writer = WavWriter::create(path, pcm16_spec(sample_rate))?;
    for &sample in samples {
        writer.write_sample(f32_to_i16(sample))?;
    }
    writer.finalize()?;
    Ok(())
}

/// Read a whole mono PCM WAV file.
pub fn read_wav(path: &Path) -> PipelineResult<(Vec<i16>, u32)> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    if spec.channels != 1 || spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(PipelineError::Decode(format!(
            "expected 16-bit mono PCM wav, got {} ch / {} bit",
            spec.channels, spec.bits_per_sample
        )));
    }
    let samples = reader
        .samples::<i16>()
        .collect::<Result<Vec<i16>, hound::Error>>()?;
    Ok((samples, spec.sample_rate))
}

/// Sample index range for a `[start, end)` time window, clamped to the file.
pub fn window_bounds(sample_rate: u32, total_samples: usize, start: f64, end: f64) -> (usize, usize) {
    let start = start.max(0.0);
    let end = end.max(start);
    let first = ((start * sample_rate as f64) as usize).min(total_samples);
    let last = ((end * sample_rate as f64) as usize).min(total_samples);
    (first, last)
}

/// Extract the samples of a time window from a canonical WAV file.
pub fn read_wav_window(path: &Path, start: f64, end: f64) -> PipelineResult<(Vec<i16>, u32)> {
    let (samples, sample_rate) = read_wav(path)?;
    let (first, last) = window_bounds(sample_rate, samples.len(), start, end);
    Ok((samples[first..last].to_vec(), sample_rate))
}

/// Encode samples as an in-memory WAV body.
pub fn wav_bytes(samples: &[i16], sample_rate: u32) -> PipelineResult<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, pcm16_spec(sample_rate))?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_bounds_clamps() {
        // 2 seconds at 16 kHz
        assert_eq!(window_bounds(16_000, 32_000, 0.0, 1.0), (0, 16_000));
        assert_eq!(window_bounds(16_000, 32_000, 1.5, 5.0), (24_000, 32_000));
        assert_eq!(window_bounds(16_000, 32_000, -1.0, 0.5), (0, 8_000));
        // inverted window collapses to empty
        assert_eq!(window_bounds(16_000, 32_000, 1.0, 0.5), (16_000, 16_000));
    }

    #[test]
    fn test_write_then_window_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("canonical.wav");

        let samples: Vec<f32> = (0..16_000).map(|i| (i % 100) as f32 / 200.0).collect();
        write_wav(&path, &samples, 16_000).unwrap();

        let (window, rate) = read_wav_window(&path, 0.25, 0.5).unwrap();
        assert_eq!(rate, 16_000);
        assert_eq!(window.len(), 4_000);
    }

    #[test]
    fn test_wav_bytes_roundtrip() {
        let samples: Vec<i16> = vec![0, 100, -100, 32_000];
        let bytes = wav_bytes(&samples, 16_000).unwrap();

        let mut reader = WavReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.spec().sample_rate, 16_000);
        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, samples);
    }
}
