//! Capture normalization and audio file handling
//!
//! Raw microphone captures arrive either as a `(sample_rate, samples)` pair
//! or as a bare sample array. Before anything touches disk the samples are
//! normalized to a frames-by-channels shape; a 1-D mono capture becomes one
//! channel. The normalized buffer is written as lossless WAV, then handed to
//! the external transcoder for a playback-friendly stereo 44.1 kHz mp3.

pub mod image;
pub mod transcode;

use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::path::Path;

pub use image::{encode_image, encode_image_bytes};
pub use transcode::transcode_to_mp3;

/// Raw sample payload as captured.
#[derive(Debug, Clone)]
pub enum SampleData {
    /// 1-D mono array.
    Mono(Vec<f32>),
    /// Interleaved frames-by-channels array.
    Frames { data: Vec<f32>, channels: u16 },
}

/// Microphone capture as delivered by the UI layer.
#[derive(Debug, Clone)]
pub enum CaptureInput {
    /// `(sample_rate, samples)` pair.
    Timed { sample_rate: u32, samples: SampleData },
    /// Bare sample array; the sample rate falls back to the configured
    /// default (44.1 kHz in the reference setup).
    Raw(SampleData),
}

/// Capture after shape normalization: always frames × channels.
#[derive(Debug, Clone)]
pub struct NormalizedAudio {
    pub interleaved: Vec<f32>,
    pub channels: u16,
    pub sample_rate: u32,
}

impl NormalizedAudio {
    pub fn frames(&self) -> usize {
        self.interleaved.len() / self.channels.max(1) as usize
    }
}

/// Normalize a capture to a frames-by-channels buffer. Mono 1-D input is
/// reshaped to one channel; a missing sample rate takes the fallback.
pub fn normalize(input: CaptureInput, fallback_sample_rate: u32) -> NormalizedAudio {
    let (sample_rate, samples) = match input {
        CaptureInput::Timed { sample_rate, samples } => (sample_rate, samples),
        CaptureInput::Raw(samples) => (fallback_sample_rate, samples),
    };

    let (interleaved, channels) = match samples {
        SampleData::Mono(data) => (data, 1),
        SampleData::Frames { data, channels } => (data, channels.max(1)),
    };

    NormalizedAudio {
        interleaved,
        channels,
        sample_rate,
    }
}

/// Write normalized samples as 16-bit PCM WAV.
pub fn write_wav(audio: &NormalizedAudio, path: &Path) -> Result<()> {
    let spec = WavSpec {
        channels: audio.channels,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file at {}", path.display()))?;

    for &sample in &audio.interleaved {
        let i16_sample = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
        writer.write_sample(i16_sample)?;
    }

    writer.finalize().context("Failed to finalize WAV file")?;
    Ok(())
}

/// Decode a WAV byte stream (as uploaded over HTTP) into a capture.
pub fn capture_from_wav_bytes(bytes: &[u8]) -> Result<CaptureInput> {
    let reader = hound::WavReader::new(std::io::Cursor::new(bytes))
        .context("Failed to parse WAV payload")?;
    let spec = reader.spec();

    let data: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .context("Failed to read float WAV samples")?,
        SampleFormat::Int => {
            let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max))
                .collect::<std::result::Result<_, _>>()
                .context("Failed to read integer WAV samples")?
        }
    };

    Ok(CaptureInput::Timed {
        sample_rate: spec.sample_rate,
        samples: SampleData::Frames {
            data,
            channels: spec.channels,
        },
    })
}
