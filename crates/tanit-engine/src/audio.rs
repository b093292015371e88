//! WAV loading and conversion to the 16 kHz mono stream speech models expect.

use rubato::{FftFixedIn, Resampler};
use std::path::Path;
use tanit_core::AsrError;

pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Samples read from a WAV file, interleaved when multi-channel.
#[derive(Debug, Clone)]
pub struct WavAudio {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<f32>,
}

impl WavAudio {
    pub fn duration_secs(&self) -> f64 {
        let frames = self.samples.len() / self.channels.max(1) as usize;
        frames as f64 / self.sample_rate as f64
    }
}

fn read_error(path: &Path, err: impl std::fmt::Display) -> AsrError {
    AsrError::ProcessingFailed(format!("failed to read audio {}: {err}", path.display()))
}

/// Read a WAV file as f32 samples. Integer formats are scaled to [-1.0, 1.0].
pub fn read_wav(path: &Path) -> Result<WavAudio, AsrError> {
    let reader = hound::WavReader::open(path).map_err(|e| read_error(path, e))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let max_value = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_value))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| read_error(path, e))?
        }
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| read_error(path, e))?,
    };

    Ok(WavAudio {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        samples,
    })
}

/// Average interleaved channels down to one.
pub fn to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    let n = channels as usize;
    samples
        .chunks_exact(n)
        .map(|frame| frame.iter().sum::<f32>() / n as f32)
        .collect()
}

pub fn resample_to_16khz(samples: &[f32], input_rate: u32) -> Result<Vec<f32>, AsrError> {
    if input_rate == TARGET_SAMPLE_RATE || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    tracing::debug!("resampling from {} Hz to {} Hz", input_rate, TARGET_SAMPLE_RATE);

    let mut resampler = FftFixedIn::<f32>::new(
        input_rate as usize,
        TARGET_SAMPLE_RATE as usize,
        1024,
        2,
        1,
    )
    .map_err(|e| AsrError::ProcessingFailed(format!("failed to create resampler: {e}")))?;

    let frames_needed = resampler.input_frames_next();
    let mut output = Vec::with_capacity(
        samples.len() * TARGET_SAMPLE_RATE as usize / input_rate as usize + frames_needed,
    );

    let mut chunks = samples.chunks_exact(frames_needed);
    for chunk in chunks.by_ref() {
        let resampled = resampler
            .process(&[chunk], None)
            .map_err(|e| AsrError::ProcessingFailed(format!("resampling failed: {e}")))?;
        output.extend_from_slice(&resampled[0]);
    }

    let remaining = chunks.remainder();
    if !remaining.is_empty() {
        let mut padded = remaining.to_vec();
        padded.resize(frames_needed, 0.0);
        let resampled = resampler
            .process(&[padded], None)
            .map_err(|e| AsrError::ProcessingFailed(format!("resampling failed: {e}")))?;

        // Keep only the output that corresponds to real input, not padding.
        let expected = (remaining.len() as f64 * TARGET_SAMPLE_RATE as f64 / input_rate as f64)
            .ceil() as usize;
        output.extend_from_slice(&resampled[0][..expected.min(resampled[0].len())]);
    }

    Ok(output)
}

/// Read `path` and return 16 kHz mono samples.
pub fn load_for_recognition(path: &Path) -> Result<Vec<f32>, AsrError> {
    let audio = read_wav(path)?;
    tracing::debug!(
        sample_rate = audio.sample_rate,
        channels = audio.channels,
        duration_secs = audio.duration_secs(),
        "loaded {:?}",
        path
    );
    let mono = to_mono(&audio.samples, audio.channels);
    resample_to_16khz(&mono, audio.sample_rate)
}
