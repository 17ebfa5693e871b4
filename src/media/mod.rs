// FFmpeg subprocess layer
//
// - Commands: command builders for the operations the pipeline needs
// - Processor: concrete implementation behind the MediaProcessorTrait seam

pub mod commands;
pub mod processor;

use async_trait::async_trait;
use std::path::Path;

pub use commands::*;
pub use processor::*;

use crate::config::MediaConfig;
use crate::error::Result;

/// Container facts needed before analysis can start
#[derive(Debug, Clone, Copy)]
pub struct MediaInfo {
    /// Container duration in seconds
    pub duration: f64,
    /// Whether the container carries at least one audio stream
    pub has_audio: bool,
}

/// Main trait for media processing operations
#[async_trait]
pub trait MediaProcessorTrait: Send + Sync {
    /// Probe container duration and audio track presence
    async fn probe(&self, video_path: &Path) -> Result<MediaInfo>;

    /// Extract audio track to a PCM WAV file, preserving channel count
    async fn extract_audio(
        &self,
        video_path: &Path,
        audio_path: &Path,
        sample_rate: u32,
    ) -> Result<()>;

    /// Cut one re-encoded segment out of the input
    async fn cut_segment(
        &self,
        input_path: &Path,
        output_path: &Path,
        start: f64,
        end: f64,
        video_codec: &str,
    ) -> Result<()>;

    /// Concatenate previously cut segments with stream copy
    async fn concat_segments(&self, list_path: &Path, output_path: &Path) -> Result<()>;

    /// Replace the audio track, looping or trimming the audio to the video duration
    async fn replace_audio(
        &self,
        video_path: &Path,
        audio_path: &Path,
        output_path: &Path,
        video_duration: f64,
        loop_audio: bool,
        video_codec: &str,
    ) -> Result<()>;

    /// Check whether a named encoder is present in this ffmpeg build
    fn has_encoder(&self, encoder: &str) -> bool;

    /// Check if the media backend is available
    fn check_availability(&self) -> Result<()>;
}

/// Factory for creating media processor instances
pub struct MediaProcessorFactory;

impl MediaProcessorFactory {
    /// Create the default media processor implementation (FFmpeg-based)
    pub fn create_processor(config: MediaConfig) -> Box<dyn MediaProcessorTrait> {
        Box::new(processor::MediaProcessorImpl::new(config))
    }
}
