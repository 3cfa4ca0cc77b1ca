// Sinc resampling to the canonical pipeline rate

use log::debug;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::error::{PipelineError, PipelineResult};

/// Resample mono audio between arbitrary rates. Quality parameters scale with
/// the conversion ratio: large rate changes get longer sinc kernels.
pub fn resample(input: &[f32], from_rate: u32, to_rate: u32) -> PipelineResult<Vec<f32>> {
    if input.is_empty() {
        return Ok(Vec::new());
    }
    if from_rate == to_rate {
        return Ok(input.to_vec());
    }

    let ratio = to_rate as f64 / from_rate as f64;
    debug!(
        "Resampling {}Hz -> {}Hz (ratio {:.3}, {} samples in)",
        from_rate,
        to_rate,
        ratio,
        input.len()
    );

    let (sinc_len, interpolation) = if ratio >= 2.0 || ratio <= 0.5 {
        (512, SincInterpolationType::Cubic)
    } else {
        (256, SincInterpolationType::Linear)
    };

    let params = SincInterpolationParameters {
        sinc_len,
        f_cutoff: 0.95,
        interpolation,
        oversampling_factor: sinc_len,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, input.len(), 1)
        .map_err(|e| PipelineError::Decode(format!("resampler init failed: {}", e)))?;

    let waves_in = vec![input.to_vec()];
    let mut waves_out = resampler
        .process(&waves_in, None)
        .map_err(|e| PipelineError::Decode(format!("resampling failed: {}", e)))?;

    let output = waves_out.remove(0);
    debug!(
        "Resampling complete: {} samples -> {} samples",
        input.len(),
        output.len()
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_rate_is_identity() {
        let input = vec![0.1, -0.2, 0.3];
        let output = resample(&input, 16_000, 16_000).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_empty_input() {
        assert!(resample(&[], 48_000, 16_000).unwrap().is_empty());
    }

    #[test]
    fn test_downsample_length_ratio() {
        // One second of a 440 Hz tone at 48 kHz should come out near one
        // second at 16 kHz.
        let input: Vec<f32> = (0..48_000)
            .map(|i| (i as f32 * 440.0 * 2.0 * std::f32::consts::PI / 48_000.0).sin())
            .collect();
        let output = resample(&input, 48_000, 16_000).unwrap();
        let expected = 16_000.0;
        assert!((output.len() as f32 - expected).abs() / expected < 0.05);
    }
}
