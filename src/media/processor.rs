use async_trait::async_trait;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

use crate::config::MediaConfig;
use crate::error::{Result, VidlocError};
use super::{MediaInfo, MediaProcessorTrait, MediaCommandBuilder};

/// A failed encode command surfaces as an `Encoding` error so callers can
/// trigger the one-shot codec fallback.
fn as_encoding_error(e: VidlocError) -> VidlocError {
    match e {
        VidlocError::Processing(msg) => VidlocError::Encoding(msg),
        other => other,
    }
}

/// Concrete implementation of media processor (FFmpeg-based)
pub struct MediaProcessorImpl {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
}

impl MediaProcessorImpl {
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.binary_path);

        Self {
            config,
            command_builder,
        }
    }

    fn run_probe(&self, args: &[&str]) -> Result<String> {
        debug!("Executing probe command: {} {:?}", self.config.probe_path, args);

        let output = Command::new(&self.config.probe_path)
            .args(args)
            .output()
            .map_err(|e| VidlocError::MediaLoad(format!("Failed to execute ffprobe: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VidlocError::MediaLoad(format!(
                "ffprobe failed: {}",
                stderr.lines().last().unwrap_or("unknown error")
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl MediaProcessorTrait for MediaProcessorImpl {
    /// Probe container duration and audio track presence
    async fn probe(&self, video_path: &Path) -> Result<MediaInfo> {
        if !video_path.exists() {
            return Err(VidlocError::MediaLoad(format!(
                "Cannot open {}: no such file",
                video_path.display()
            )));
        }

        let duration_raw = self.run_probe(&[
            "-v", "error",
            "-show_entries", "format=duration",
            "-of", "default=noprint_wrappers=1:nokey=1",
            &video_path.to_string_lossy(),
        ])?;

        let duration: f64 = duration_raw.parse().map_err(|_| {
            VidlocError::MediaLoad(format!(
                "Unreadable duration '{}' for {}",
                duration_raw,
                video_path.display()
            ))
        })?;

        let audio_streams = self.run_probe(&[
            "-v", "error",
            "-select_streams", "a",
            "-show_entries", "stream=codec_type",
            "-of", "csv=p=0",
            &video_path.to_string_lossy(),
        ])?;

        Ok(MediaInfo {
            duration,
            has_audio: !audio_streams.is_empty(),
        })
    }

    /// Extract audio track to a PCM WAV file, preserving channel count
    async fn extract_audio(
        &self,
        video_path: &Path,
        audio_path: &Path,
        sample_rate: u32,
    ) -> Result<()> {
        info!("Extracting audio from {} to {}", video_path.display(), audio_path.display());

        self.command_builder
            .extract_audio(video_path, audio_path, sample_rate)
            .execute()
            .map_err(|e| match e {
                // A failed extraction means the track could not be read
                VidlocError::Processing(msg) => VidlocError::MediaLoad(msg),
                other => other,
            })?;

        info!("Audio extraction completed");
        Ok(())
    }

    /// Cut one re-encoded segment out of the input
    async fn cut_segment(
        &self,
        input_path: &Path,
        output_path: &Path,
        start: f64,
        end: f64,
        video_codec: &str,
    ) -> Result<()> {
        self.command_builder
            .cut_segment(
                input_path,
                output_path,
                start,
                end,
                video_codec,
                &self.config.audio_bitrate,
                &self.config.encode_options,
            )
            .execute()
            .map_err(as_encoding_error)
    }

    /// Concatenate previously cut segments with stream copy
    async fn concat_segments(&self, list_path: &Path, output_path: &Path) -> Result<()> {
        self.command_builder
            .concat_segments(list_path, output_path)
            .execute()
            .map_err(as_encoding_error)
    }

    /// Replace the audio track, looping or trimming the audio to the video duration
    async fn replace_audio(
        &self,
        video_path: &Path,
        audio_path: &Path,
        output_path: &Path,
        video_duration: f64,
        loop_audio: bool,
        video_codec: &str,
    ) -> Result<()> {
        info!(
            "Replacing audio of {} with {} -> {}",
            video_path.display(),
            audio_path.display(),
            output_path.display()
        );

        self.command_builder
            .replace_audio(
                video_path,
                audio_path,
                output_path,
                video_duration,
                loop_audio,
                video_codec,
                &self.config.audio_bitrate,
            )
            .execute()
            .map_err(as_encoding_error)
    }

    /// Check whether a named encoder is present in this ffmpeg build
    fn has_encoder(&self, encoder: &str) -> bool {
        self.command_builder
            .list_encoders()
            .capture_stdout()
            .map(|listing| listing.contains(encoder))
            .unwrap_or(false)
    }

    /// Check if ffmpeg is available
    fn check_availability(&self) -> Result<()> {
        self.command_builder
            .version_check()
            .capture_stdout()
            .map_err(|e| VidlocError::MediaLoad(format!("FFmpeg not found: {}", e)))?;

        info!("FFmpeg is available");
        Ok(())
    }
}
