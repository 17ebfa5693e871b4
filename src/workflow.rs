use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::dub::Dubber;
use crate::error::{Result, VidlocError};
use crate::media::{MediaProcessorFactory, MediaProcessorTrait};
use crate::silence::{Acceleration, SilenceRemover, OUTPUT_SUFFIX};
use crate::transcribe::Transcriber;
use crate::translate::Translator;

const VIDEO_EXTENSIONS: [&str; 7] = ["mp4", "avi", "mov", "mkv", "wmv", "flv", "webm"];

pub struct Workflow {
    config: Config,
    media: Box<dyn MediaProcessorTrait>,
    accel: Acceleration,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let media = MediaProcessorFactory::create_processor(config.media.clone());
        media.check_availability()?;

        // One-time capability probe, injected into every stage that needs it
        let accel = Acceleration::probe(media.as_ref());

        Ok(Self {
            config,
            media,
            accel,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_processor(
        config: Config,
        media: Box<dyn MediaProcessorTrait>,
        accel: Acceleration,
    ) -> Self {
        Self {
            config,
            media,
            accel,
        }
    }

    /// Remove silence from a single video file
    pub async fn cut_silence(&self, input_path: &Path) -> Result<Option<PathBuf>> {
        if !input_path.exists() {
            return Err(VidlocError::FileNotFound(input_path.display().to_string()));
        }

        let remover = SilenceRemover::new(
            self.config.silence.clone(),
            self.media.as_ref(),
            self.accel,
        );
        remover.remove_silence(input_path).await
    }

    /// Remove silence from every video in a directory, strictly one file at
    /// a time. A failed file is reported and the batch continues.
    pub async fn cut_silence_batch(&self, input_dir: &Path) -> Result<()> {
        if !input_dir.is_dir() {
            return Err(VidlocError::Config(format!(
                "{} is not a directory",
                input_dir.display()
            )));
        }

        let video_files = find_video_files(input_dir);
        info!("Found {} video file(s) to process", video_files.len());

        let mut succeeded = 0usize;
        let mut failed = 0usize;

        for video_path in video_files {
            info!("Processing file: {}", video_path.display());
            match self.cut_silence(&video_path).await {
                Ok(Some(output)) => {
                    succeeded += 1;
                    info!("Successfully processed: {} -> {}", video_path.display(), output.display());
                }
                Ok(None) => {
                    succeeded += 1;
                    info!("Fully silent, nothing written: {}", video_path.display());
                }
                Err(e) => {
                    failed += 1;
                    warn!("Failed to process {}: {}", video_path.display(), e);
                }
            }
        }

        info!("Batch finished: {} succeeded, {} failed", succeeded, failed);
        Ok(())
    }

    /// Transcribe a video to an SRT file
    pub async fn transcribe(
        &self,
        input_path: &Path,
        output_path: Option<&Path>,
    ) -> Result<PathBuf> {
        let transcriber = Transcriber::new(self.config.transcriber.clone());
        transcriber.transcribe_to_srt(input_path, output_path).await
    }

    /// Translate an SRT file to the target language
    pub async fn translate(
        &self,
        input_path: &Path,
        output_path: Option<&Path>,
        target_language: Option<&str>,
    ) -> Result<PathBuf> {
        if !input_path.exists() {
            return Err(VidlocError::FileNotFound(input_path.display().to_string()));
        }

        let translator = Translator::new(self.config.translate.clone())?;
        translator.check_availability().await?;

        let target = target_language.unwrap_or(&self.config.translate.target_language);
        translator.translate_srt(input_path, output_path, target).await
    }

    /// Replace a video's audio track with an external audio file
    pub async fn dub(
        &self,
        video_path: &Path,
        audio_path: &Path,
        output_path: &Path,
    ) -> Result<()> {
        for path in [video_path, audio_path] {
            if !path.exists() {
                return Err(VidlocError::FileNotFound(path.display().to_string()));
            }
        }

        let dubber = Dubber::new(self.media.as_ref(), self.accel);
        dubber.replace_audio(video_path, audio_path, output_path).await
    }
}

/// Collect video files under a directory, skipping outputs of earlier runs
fn find_video_files(input_dir: &Path) -> Vec<PathBuf> {
    let mut video_files = Vec::new();

    for entry in WalkDir::new(input_dir).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if !VIDEO_EXTENSIONS.contains(&extension.to_lowercase().as_str()) {
            continue;
        }
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        if stem.ends_with(OUTPUT_SUFFIX) {
            continue;
        }
        video_files.push(path.to_path_buf());
    }

    video_files.sort();
    video_files
}
