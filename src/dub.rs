use std::path::Path;
use tracing::{info, warn};

use crate::error::{Result, VidlocError};
use crate::media::MediaProcessorTrait;
use crate::silence::{Acceleration, FALLBACK_CODEC};

/// How the replacement audio must be fitted to the video duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioAdjustment {
    /// Audio is shorter than the video and repeats until the video ends
    Loop,
    /// Audio is longer than the video and is cut at the video end
    Trim,
    /// Durations already match
    AsIs,
}

/// Durations closer than this are treated as equal (one PAL frame)
const DURATION_TOLERANCE: f64 = 0.04;

pub fn plan_adjustment(video_duration: f64, audio_duration: f64) -> AudioAdjustment {
    if (video_duration - audio_duration).abs() <= DURATION_TOLERANCE {
        AudioAdjustment::AsIs
    } else if audio_duration < video_duration {
        AudioAdjustment::Loop
    } else {
        AudioAdjustment::Trim
    }
}

/// Dubbing stage: replace a video's audio track with an external file.
pub struct Dubber<'a> {
    media: &'a dyn MediaProcessorTrait,
    accel: Acceleration,
}

impl<'a> Dubber<'a> {
    pub fn new(media: &'a dyn MediaProcessorTrait, accel: Acceleration) -> Self {
        Self { media, accel }
    }

    /// Mux `audio_path` onto `video_path`, looping or trimming the audio to
    /// the video duration, encoding with the preferred codec and falling
    /// back once to the universal one.
    pub async fn replace_audio(
        &self,
        video_path: &Path,
        audio_path: &Path,
        output_path: &Path,
    ) -> Result<()> {
        let video_info = self.media.probe(video_path).await?;
        let audio_info = self.media.probe(audio_path).await?;

        let adjustment = plan_adjustment(video_info.duration, audio_info.duration);
        info!(
            "Dubbing {} ({:.1}s) with {} ({:.1}s), adjustment: {:?}",
            video_path.display(),
            video_info.duration,
            audio_path.display(),
            audio_info.duration,
            adjustment
        );

        let loop_audio = adjustment == AudioAdjustment::Loop;
        let preferred = self.accel.preferred_codec();

        let attempt = self
            .media
            .replace_audio(
                video_path,
                audio_path,
                output_path,
                video_info.duration,
                loop_audio,
                preferred,
            )
            .await;

        match attempt {
            Ok(()) => {}
            Err(VidlocError::Encoding(reason)) if preferred != FALLBACK_CODEC => {
                warn!(
                    "{} encoding failed ({}), retrying with {}",
                    preferred, reason, FALLBACK_CODEC
                );
                self.media
                    .replace_audio(
                        video_path,
                        audio_path,
                        output_path,
                        video_info.duration,
                        loop_audio,
                        FALLBACK_CODEC,
                    )
                    .await?;
            }
            Err(e) => return Err(e),
        }

        info!("Dubbed video saved to {}", output_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorter_audio_loops() {
        assert_eq!(plan_adjustment(60.0, 45.0), AudioAdjustment::Loop);
    }

    #[test]
    fn test_longer_audio_trims() {
        assert_eq!(plan_adjustment(60.0, 75.0), AudioAdjustment::Trim);
    }

    #[test]
    fn test_matching_durations_pass_through() {
        assert_eq!(plan_adjustment(60.0, 60.0), AudioAdjustment::AsIs);
        assert_eq!(plan_adjustment(60.0, 60.02), AudioAdjustment::AsIs);
    }

    #[tokio::test]
    async fn test_dub_falls_back_to_universal_encoder() {
        use crate::media::mock::MockMedia;
        use crate::silence::ClassifyBackend;

        let mut mock = MockMedia::voiced(10.0, Vec::new());
        mock.nvenc = true;
        mock.failing_codecs = vec!["h264_nvenc".to_string()];

        let accel = Acceleration {
            backend: ClassifyBackend::Sequential,
            nvenc: true,
        };
        let dubber = Dubber::new(&mock, accel);

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("dubbed.mp4");
        dubber
            .replace_audio(Path::new("video.mp4"), Path::new("voice.mp3"), &output)
            .await
            .unwrap();

        assert!(output.exists());
        let dubs = mock.dubs.lock().unwrap();
        assert_eq!(dubs.as_slice(), &[(false, FALLBACK_CODEC.to_string())]);
    }
}
