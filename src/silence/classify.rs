use rayon::prelude::*;
use tracing::info;

use crate::media::MediaProcessorTrait;

/// Strategy for the per-sample amplitude comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifyBackend {
    Sequential,
    Parallel,
}

/// One-time capability probe, performed at startup and passed explicitly
/// into the classification and encoding steps.
#[derive(Debug, Clone, Copy)]
pub struct Acceleration {
    pub backend: ClassifyBackend,
    /// Whether the ffmpeg build carries the NVENC H.264 encoder
    pub nvenc: bool,
}

impl Acceleration {
    pub fn probe(media: &dyn MediaProcessorTrait) -> Self {
        let threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let backend = if threads > 1 {
            ClassifyBackend::Parallel
        } else {
            ClassifyBackend::Sequential
        };

        let nvenc = media.has_encoder("h264_nvenc");

        info!(
            "Capability probe: classification={:?} ({} threads), gpu_encoder={}",
            backend,
            threads,
            if nvenc { "h264_nvenc" } else { "unavailable" }
        );

        Self { backend, nvenc }
    }

    /// Preferred video encoder given the probe result
    pub fn preferred_codec(&self) -> &'static str {
        if self.nvenc {
            "h264_nvenc"
        } else {
            FALLBACK_CODEC
        }
    }
}

impl Default for Acceleration {
    fn default() -> Self {
        Self {
            backend: ClassifyBackend::Sequential,
            nvenc: false,
        }
    }
}

/// Universally supported encoder used when the preferred one fails
pub const FALLBACK_CODEC: &str = "libx264";

/// Flag every sample whose absolute amplitude is below the threshold.
///
/// The parallel path is a pure throughput optimization; both backends must
/// produce the same boolean for every sample.
pub fn silence_mask(samples: &[f32], threshold: f32, backend: ClassifyBackend) -> Vec<bool> {
    match backend {
        ClassifyBackend::Sequential => {
            samples.iter().map(|s| s.abs() < threshold).collect()
        }
        ClassifyBackend::Parallel => {
            samples.par_iter().map(|s| s.abs() < threshold).collect()
        }
    }
}
