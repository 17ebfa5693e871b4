use std::path::Path;
use tracing::debug;

use crate::error::{Result, VidlocError};

/// Sample rate the audio track is resampled to before analysis
pub const ANALYSIS_SAMPLE_RATE: u32 = 44100;

/// Mono waveform with amplitudes normalized to [-1.0, 1.0]
#[derive(Debug, Clone)]
pub struct Waveform {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Waveform {
    /// Load a PCM WAV file, downmix to mono, and normalize.
    ///
    /// Multi-channel input is downmixed by averaging the channel values of
    /// each frame. A file whose maximum absolute sample is zero cannot be
    /// normalized and is rejected as degenerate.
    pub fn from_wav_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();

        debug!(
            "Loaded WAV: {} Hz, {} channel(s), {} bits",
            spec.sample_rate, spec.channels, spec.bits_per_sample
        );

        let raw: Vec<i16> = reader
            .samples::<i16>()
            .collect::<std::result::Result<_, _>>()?;

        let samples = downmix(&raw, spec.channels as usize);
        let mut waveform = Self {
            samples,
            sample_rate: spec.sample_rate,
        };
        waveform.normalize()?;

        Ok(waveform)
    }

    /// Divide every sample by the global maximum absolute value.
    fn normalize(&mut self) -> Result<()> {
        let max_abs = self
            .samples
            .iter()
            .fold(0.0f32, |acc, s| acc.max(s.abs()));

        if max_abs == 0.0 {
            return Err(VidlocError::DegenerateInput(
                "audio track is silent throughout, nothing to normalize".to_string(),
            ));
        }

        for sample in &mut self.samples {
            *sample /= max_abs;
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Average interleaved channel values into one mono sample per frame.
/// A trailing incomplete frame is dropped.
fn downmix(raw: &[i16], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return raw.iter().map(|&s| s as f32).collect();
    }

    raw.chunks_exact(channels)
        .map(|frame| {
            let sum: f32 = frame.iter().map(|&s| s as f32).sum();
            sum / channels as f32
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn write_wav(samples: &[i16], channels: u16, sample_rate: u32) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut buf = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut buf, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        buf.into_inner()
    }

    fn load_from_bytes(bytes: Vec<u8>) -> Result<Waveform> {
        let temp = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
        std::fs::write(temp.path(), bytes).unwrap();
        Waveform::from_wav_file(temp.path())
    }

    #[test]
    fn test_mono_normalization() {
        let bytes = write_wav(&[0, 100, -200, 50], 1, 44100);
        let waveform = load_from_bytes(bytes).unwrap();

        assert_eq!(waveform.len(), 4);
        assert!((waveform.samples[2] - (-1.0)).abs() < 1e-6);
        assert!((waveform.samples[1] - 0.5).abs() < 1e-6);
        assert!(waveform.samples.iter().all(|s| s.abs() <= 1.0));
    }

    #[test]
    fn test_stereo_downmix_averages_channels() {
        // Frames: (100, 300) -> 200, (-200, 0) -> -100
        let bytes = write_wav(&[100, 300, -200, 0], 2, 44100);
        let waveform = load_from_bytes(bytes).unwrap();

        assert_eq!(waveform.len(), 2);
        assert!((waveform.samples[0] - 1.0).abs() < 1e-6);
        assert!((waveform.samples[1] - (-0.5)).abs() < 1e-6);
    }

    #[test]
    fn test_fully_silent_file_is_degenerate() {
        let bytes = write_wav(&[0, 0, 0, 0], 1, 44100);
        let err = load_from_bytes(bytes).unwrap_err();

        assert!(matches!(err, VidlocError::DegenerateInput(_)));
    }

    #[test]
    fn test_normalized_values_never_nan() {
        let bytes = write_wav(&[1, -1, 32767, -32768], 1, 44100);
        let waveform = load_from_bytes(bytes).unwrap();

        assert!(waveform.samples.iter().all(|s| s.is_finite()));
    }
}
