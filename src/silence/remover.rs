use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::SilenceConfig;
use crate::error::{Result, VidlocError};
use crate::media::MediaProcessorTrait;
use super::classify::{silence_mask, Acceleration, FALLBACK_CODEC};
use super::segment::{keep_intervals, kept_duration, KeepInterval};
use super::waveform::{Waveform, ANALYSIS_SAMPLE_RATE};

/// Suffix appended to the input stem for the output file
pub const OUTPUT_SUFFIX: &str = "_no_silence";

/// Per-file silence removal pipeline:
/// decode -> normalize -> classify -> segment -> cut -> encode.
pub struct SilenceRemover<'a> {
    config: SilenceConfig,
    media: &'a dyn MediaProcessorTrait,
    accel: Acceleration,
}

impl<'a> SilenceRemover<'a> {
    pub fn new(config: SilenceConfig, media: &'a dyn MediaProcessorTrait, accel: Acceleration) -> Self {
        Self {
            config,
            media,
            accel,
        }
    }

    /// Remove silent spans from one video.
    ///
    /// Returns the output path, or `None` when the whole file was classified
    /// silent and no output was written (a valid terminal outcome).
    pub async fn remove_silence(&self, video_path: &Path) -> Result<Option<PathBuf>> {
        info!("Loading video {}", video_path.display());

        let media_info = self.media.probe(video_path).await?;
        if !media_info.has_audio {
            return Err(VidlocError::MediaLoad(format!(
                "{} has no audio track",
                video_path.display()
            )));
        }

        info!("Extracting audio...");
        // NamedTempFile is removed on drop, on every exit path
        let temp_audio = tempfile::Builder::new()
            .prefix("vidloc_audio_")
            .suffix(".wav")
            .tempfile()?;
        self.media
            .extract_audio(video_path, temp_audio.path(), ANALYSIS_SAMPLE_RATE)
            .await?;

        info!("Analyzing audio...");
        let analysis_start = std::time::Instant::now();
        let intervals = self.analyze(temp_audio.path(), media_info.duration)?;
        info!(
            "Audio analysis completed in {:.2}s using the {:?} backend",
            analysis_start.elapsed().as_secs_f64(),
            self.accel.backend
        );

        drop(temp_audio);

        if intervals.is_empty() {
            info!(
                "Entire file classified silent, no output written for {}",
                video_path.display()
            );
            return Ok(None);
        }

        info!(
            "Keeping {} segment(s), {:.1}s of {:.1}s",
            intervals.len(),
            kept_duration(&intervals),
            media_info.duration
        );

        let output_path = derive_output_path(video_path)?;
        self.cut_and_concat(video_path, &output_path, &intervals)
            .await?;

        info!("Saved {}", output_path.display());
        Ok(Some(output_path))
    }

    /// Run waveform analysis and derive keep-intervals. The waveform buffer
    /// lives only inside this call and is released before encoding begins.
    fn analyze(&self, audio_path: &Path, duration: f64) -> Result<Vec<KeepInterval>> {
        let waveform = Waveform::from_wav_file(audio_path)?;
        if waveform.is_empty() {
            return Err(VidlocError::MediaLoad(
                "extracted audio contains no samples".to_string(),
            ));
        }

        let mask = silence_mask(&waveform.samples, self.config.threshold, self.accel.backend);

        Ok(keep_intervals(
            &mask,
            waveform.sample_rate,
            self.config.min_silence_duration,
            self.config.silent_window_ratio,
            duration,
        ))
    }

    /// Cut each keep-interval and concatenate the pieces into the output.
    ///
    /// All intermediate files live in a scratch directory next to the
    /// output, so the final rename never crosses filesystems and a failed
    /// run leaves no partial output in place.
    async fn cut_and_concat(
        &self,
        video_path: &Path,
        output_path: &Path,
        intervals: &[KeepInterval],
    ) -> Result<()> {
        let parent = output_path
            .parent()
            .ok_or_else(|| VidlocError::Processing("output path has no parent".to_string()))?;

        let preferred = self.accel.preferred_codec();
        match self
            .encode_segments(video_path, output_path, intervals, parent, preferred)
            .await
        {
            Ok(()) => Ok(()),
            Err(VidlocError::Encoding(reason)) if preferred != FALLBACK_CODEC => {
                warn!(
                    "{} encoding failed ({}), retrying with {}",
                    preferred, reason, FALLBACK_CODEC
                );
                self.encode_segments(video_path, output_path, intervals, parent, FALLBACK_CODEC)
                    .await
            }
            Err(e) => Err(e),
        }
    }

    async fn encode_segments(
        &self,
        video_path: &Path,
        output_path: &Path,
        intervals: &[KeepInterval],
        scratch_parent: &Path,
        video_codec: &str,
    ) -> Result<()> {
        let scratch = tempfile::Builder::new()
            .prefix(".vidloc_segments_")
            .tempdir_in(scratch_parent)?;

        let pb = ProgressBar::new(intervals.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} segments")
                .unwrap()
                .progress_chars("#>-"),
        );

        let mut segment_paths = Vec::with_capacity(intervals.len());
        for (i, interval) in intervals.iter().enumerate() {
            let segment_path = scratch.path().join(format!("seg_{:04}.mp4", i));
            self.media
                .cut_segment(
                    video_path,
                    &segment_path,
                    interval.start,
                    interval.end,
                    video_codec,
                )
                .await?;
            segment_paths.push(segment_path);
            pb.inc(1);
        }
        pb.finish_and_clear();

        let list_path = scratch.path().join("concat.txt");
        let list_content: String = segment_paths
            .iter()
            .map(|p| format!("file '{}'\n", p.display()))
            .collect();
        std::fs::write(&list_path, &list_content)?;

        // Concatenate into the scratch directory first; only a complete
        // output is renamed into place. The staged file keeps the output
        // name so ffmpeg infers the container format from its extension.
        let staged_name = output_path
            .file_name()
            .ok_or_else(|| VidlocError::Processing("output path has no file name".to_string()))?;
        let staged_output = scratch.path().join(staged_name);
        self.media.concat_segments(&list_path, &staged_output).await?;
        std::fs::rename(&staged_output, output_path)?;

        Ok(())
    }
}

/// Sibling output path `<stem>_no_silence.<ext>`
pub fn derive_output_path(video_path: &Path) -> Result<PathBuf> {
    let stem = video_path
        .file_stem()
        .ok_or_else(|| VidlocError::Processing("input has no file name".to_string()))?
        .to_string_lossy();
    let extension = video_path
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_else(|| "mp4".to_string());

    Ok(video_path.with_file_name(format!("{}{}.{}", stem, OUTPUT_SUFFIX, extension)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::mock::MockMedia;
    use crate::silence::ClassifyBackend;

    const SR: usize = 44100;

    fn silence_config() -> SilenceConfig {
        SilenceConfig {
            threshold: 0.01,
            min_silence_duration: 1.0,
            silent_window_ratio: 0.8,
        }
    }

    /// Build a mono signal from per-second voiced flags: voiced seconds
    /// alternate at full swing, silent seconds stay at zero.
    fn signal(voiced_by_second: &[bool]) -> Vec<i16> {
        let mut samples = Vec::with_capacity(voiced_by_second.len() * SR);
        for &voiced in voiced_by_second {
            for i in 0..SR {
                let value = if voiced {
                    if i % 2 == 0 { 16000 } else { -16000 }
                } else {
                    0
                };
                samples.push(value);
            }
        }
        samples
    }

    #[tokio::test]
    async fn test_end_to_end_silent_middle() {
        // 10 s with silence during [3, 5): expect cuts (0,3) and (5,10)
        let voiced = [
            true, true, true, false, false, true, true, true, true, true,
        ];
        let mock = MockMedia::voiced(10.0, signal(&voiced));
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("lesson.mp4");

        let remover = SilenceRemover::new(silence_config(), &mock, Acceleration::default());
        let output = remover.remove_silence(&video).await.unwrap().unwrap();

        assert_eq!(output, dir.path().join("lesson_no_silence.mp4"));
        assert!(output.exists());

        let cuts = mock.cuts.lock().unwrap();
        assert_eq!(cuts.len(), 2);
        assert!((cuts[0].0 - 0.0).abs() < 1e-9 && (cuts[0].1 - 3.0).abs() < 1e-9);
        assert!((cuts[1].0 - 5.0).abs() < 1e-9 && (cuts[1].1 - 10.0).abs() < 1e-9);
        assert_eq!(*mock.concats.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_backends_derive_identical_intervals() {
        let voiced = [true, false, true, false, true];
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("talk.mp4");

        let mut cut_lists = Vec::new();
        for backend in [ClassifyBackend::Sequential, ClassifyBackend::Parallel] {
            let mock = MockMedia::voiced(5.0, signal(&voiced));
            let accel = Acceleration {
                backend,
                nvenc: false,
            };
            let remover = SilenceRemover::new(silence_config(), &mock, accel);
            remover.remove_silence(&video).await.unwrap().unwrap();
            cut_lists.push(mock.cuts.lock().unwrap().clone());
        }

        assert_eq!(cut_lists[0], cut_lists[1]);
    }

    #[tokio::test]
    async fn test_gpu_encoder_falls_back_to_universal() {
        let voiced = [true, true, false, true];
        let mut mock = MockMedia::voiced(4.0, signal(&voiced));
        mock.nvenc = true;
        mock.failing_codecs = vec!["h264_nvenc".to_string()];
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("lesson.mp4");

        let accel = Acceleration {
            backend: ClassifyBackend::Sequential,
            nvenc: true,
        };
        let remover = SilenceRemover::new(silence_config(), &mock, accel);
        let output = remover.remove_silence(&video).await.unwrap().unwrap();

        assert!(output.exists());
        let cuts = mock.cuts.lock().unwrap();
        assert!(!cuts.is_empty());
        assert!(cuts.iter().all(|(_, _, codec)| codec == FALLBACK_CODEC));
    }

    #[tokio::test]
    async fn test_fully_silent_classification_writes_nothing() {
        // One loud spike per window keeps normalization valid while every
        // window stays above the silent-sample ratio.
        let mut samples = vec![0i16; SR * 2];
        samples[0] = 16000;
        samples[SR] = 16000;
        let mock = MockMedia::voiced(2.0, samples);
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("quiet.mp4");

        let remover = SilenceRemover::new(silence_config(), &mock, Acceleration::default());
        let result = remover.remove_silence(&video).await.unwrap();

        assert!(result.is_none());
        assert!(!dir.path().join("quiet_no_silence.mp4").exists());
        assert!(mock.cuts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_all_zero_audio_is_degenerate() {
        let mock = MockMedia::voiced(2.0, vec![0i16; SR * 2]);
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("dead.mp4");

        let remover = SilenceRemover::new(silence_config(), &mock, Acceleration::default());
        let err = remover.remove_silence(&video).await.unwrap_err();

        assert!(matches!(err, VidlocError::DegenerateInput(_)));
        assert!(!dir.path().join("dead_no_silence.mp4").exists());
    }

    #[tokio::test]
    async fn test_missing_audio_track_is_media_load_error() {
        let mut mock = MockMedia::voiced(2.0, vec![0i16; SR]);
        mock.has_audio = false;
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("mute.mp4");

        let remover = SilenceRemover::new(silence_config(), &mock, Acceleration::default());
        let err = remover.remove_silence(&video).await.unwrap_err();

        assert!(matches!(err, VidlocError::MediaLoad(_)));
    }

    #[test]
    fn test_derive_output_path_keeps_extension() {
        let output = derive_output_path(Path::new("/videos/lesson01.mkv")).unwrap();
        assert_eq!(output, PathBuf::from("/videos/lesson01_no_silence.mkv"));
    }

    #[test]
    fn test_derive_output_path_defaults_to_mp4() {
        let output = derive_output_path(Path::new("/videos/lesson01")).unwrap();
        assert_eq!(output, PathBuf::from("/videos/lesson01_no_silence.mp4"));
    }
}
