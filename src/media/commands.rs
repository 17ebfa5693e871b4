use std::path::Path;
use std::process::Command;
use tracing::debug;

use crate::error::{Result, VidlocError};

/// Abstract ffmpeg command representation
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl MediaCommand {
    /// Create a new media processing command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Set video codec
    pub fn video_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:v").arg(codec)
    }

    /// Set audio codec
    pub fn audio_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:a").arg(codec)
    }

    /// Copy video stream
    pub fn copy_video(self) -> Self {
        self.video_codec("copy")
    }

    /// Copy audio stream
    pub fn copy_audio(self) -> Self {
        self.audio_codec("copy")
    }

    /// Disable video
    pub fn no_video(self) -> Self {
        self.arg("-vn")
    }

    /// Set audio sample rate
    pub fn audio_sample_rate(self, rate: u32) -> Self {
        self.arg("-ar").arg(rate.to_string())
    }

    /// Set audio bitrate
    pub fn audio_bitrate<S: Into<String>>(self, bitrate: S) -> Self {
        self.arg("-b:a").arg(bitrate)
    }

    /// Seek to a position before decoding the next input
    pub fn seek(self, seconds: f64) -> Self {
        self.arg("-ss").arg(format!("{:.3}", seconds))
    }

    /// Limit output duration
    pub fn duration(self, seconds: f64) -> Self {
        self.arg("-t").arg(format!("{:.3}", seconds))
    }

    /// Execute the command, failing on a non-zero exit status
    pub fn execute(&self) -> Result<()> {
        debug!("Executing media command: {} {:?}", self.binary_path, self.args);
        debug!("Description: {}", self.description);

        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .output()
            .map_err(|e| VidlocError::MediaLoad(format!("Failed to execute ffmpeg: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VidlocError::Processing(format!(
                "{} failed: {}",
                self.description,
                stderr.lines().last().unwrap_or("unknown error")
            )));
        }

        Ok(())
    }

    /// Execute the command and return its stdout, for probe-style commands
    pub fn capture_stdout(&self) -> Result<String> {
        debug!("Executing media command: {} {:?}", self.binary_path, self.args);

        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .output()
            .map_err(|e| VidlocError::MediaLoad(format!("Failed to execute ffmpeg: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VidlocError::Processing(format!(
                "{} failed: {}",
                self.description,
                stderr.lines().last().unwrap_or("unknown error")
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// Builder for the ffmpeg operations used by the pipeline
pub struct MediaCommandBuilder {
    binary_path: String,
}

impl MediaCommandBuilder {
    pub fn new<S: Into<String>>(binary_path: S) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    /// Extract the audio track to a PCM WAV file at the given sample rate.
    /// Channel count is preserved so the caller can downmix itself.
    pub fn extract_audio<P: AsRef<Path>>(
        &self,
        video_path: P,
        audio_path: P,
        sample_rate: u32,
    ) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Audio extraction")
            .input(video_path)
            .no_video()
            .audio_codec("pcm_s16le")
            .audio_sample_rate(sample_rate)
            .overwrite()
            .output(audio_path)
    }

    /// Cut one segment with frame-accurate seeking.
    ///
    /// Two-pass seeking: a fast input seek lands near the target keyframe,
    /// then an accurate output seek trims the remainder. Stream copy cannot
    /// cut between keyframes, so the segment is re-encoded.
    pub fn cut_segment<P: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: P,
        start: f64,
        end: f64,
        video_codec: &str,
        audio_bitrate: &str,
        extra_options: &[String],
    ) -> MediaCommand {
        let fast_seek = if start > 5.0 { start - 5.0 } else { 0.0 };
        let accurate_seek = start - fast_seek;

        let mut cmd = MediaCommand::new(
            &self.binary_path,
            format!("Segment cut [{:.3}s, {:.3}s)", start, end),
        )
        .overwrite()
        .arg("-hide_banner")
        .arg("-loglevel")
        .arg("error")
        .seek(fast_seek)
        .input(input_path)
        .seek(accurate_seek)
        .duration(end - start)
        .video_codec(video_codec)
        .audio_codec("aac")
        .audio_bitrate(audio_bitrate)
        .arg("-avoid_negative_ts")
        .arg("make_zero");

        for option in extra_options {
            cmd = cmd.arg(option);
        }

        cmd.output(output_path)
    }

    /// Concatenate segment files listed in a concat demuxer list file.
    /// Segments were already re-encoded uniformly, so stream copy suffices.
    pub fn concat_segments<P: AsRef<Path>>(
        &self,
        list_path: P,
        output_path: P,
    ) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Segment concatenation")
            .overwrite()
            .arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .arg("-f")
            .arg("concat")
            .arg("-safe")
            .arg("0")
            .input(list_path)
            .copy_video()
            .copy_audio()
            .arg("-movflags")
            .arg("+faststart")
            .output(output_path)
    }

    /// Replace a video's audio track with an external audio file.
    ///
    /// When `loop_audio` is set the audio input repeats until `-t` cuts the
    /// output at the video duration; otherwise a longer audio track is
    /// trimmed by the same `-t`.
    pub fn replace_audio<P: AsRef<Path>>(
        &self,
        video_path: P,
        audio_path: P,
        output_path: P,
        video_duration: f64,
        loop_audio: bool,
        video_codec: &str,
        audio_bitrate: &str,
    ) -> MediaCommand {
        let mut cmd = MediaCommand::new(&self.binary_path, "Audio replacement")
            .overwrite()
            .arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .input(video_path);

        if loop_audio {
            cmd = cmd.arg("-stream_loop").arg("-1");
        }

        cmd.input(audio_path)
            .arg("-map")
            .arg("0:v:0")
            .arg("-map")
            .arg("1:a:0")
            .video_codec(video_codec)
            .audio_codec("aac")
            .audio_bitrate(audio_bitrate)
            .duration(video_duration)
            .arg("-movflags")
            .arg("+faststart")
            .arg("-pix_fmt")
            .arg("yuv420p")
            .output(output_path)
    }

    /// List available encoders, used by the capability probe
    pub fn list_encoders(&self) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Encoder listing")
            .arg("-hide_banner")
            .arg("-encoders")
    }

    /// Build version check command
    pub fn version_check(&self) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Version check").arg("-version")
    }
}
