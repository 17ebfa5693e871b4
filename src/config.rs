use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::error::{Result, VidlocError};

fn default_threshold() -> f32 {
    0.01
}

fn default_min_silence_duration() -> f64 {
    1.0
}

fn default_silent_window_ratio() -> f32 {
    0.8
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub silence: SilenceConfig,
    pub media: MediaConfig,
    pub transcriber: TranscriberConfig,
    pub translate: TranslateConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SilenceConfig {
    /// Normalized amplitude below which a sample counts as silent
    #[serde(default = "default_threshold")]
    pub threshold: f32,
    /// Window size for silence aggregation, in seconds
    #[serde(default = "default_min_silence_duration")]
    pub min_silence_duration: f64,
    /// Fraction of silent samples required to mark a whole window silent
    #[serde(default = "default_silent_window_ratio")]
    pub silent_window_ratio: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Path to ffprobe binary
    pub probe_path: String,
    /// Audio bitrate for re-encoded output
    pub audio_bitrate: String,
    /// Additional encoding options appended to every encode command
    pub encode_options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriberConfig {
    /// Path to whisper binary
    pub binary_path: String,
    /// Model to use for transcription
    pub model: String,
    /// Source language hint, empty for auto-detection
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Ollama endpoint URL
    pub endpoint: String,
    /// LLM model to use for translation
    pub model: String,
    /// Default target language code
    pub target_language: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            silence: SilenceConfig {
                threshold: default_threshold(),
                min_silence_duration: default_min_silence_duration(),
                silent_window_ratio: default_silent_window_ratio(),
            },
            media: MediaConfig {
                binary_path: "ffmpeg".to_string(),
                probe_path: "ffprobe".to_string(),
                audio_bitrate: "192k".to_string(),
                encode_options: vec![
                    // Example options users can customize:
                    // "-preset".to_string(), "fast".to_string(),
                    // "-pix_fmt".to_string(), "yuv420p".to_string(),
                ],
            },
            transcriber: TranscriberConfig {
                binary_path: "whisper".to_string(),
                model: "medium".to_string(),
                language: String::new(),
            },
            translate: TranslateConfig {
                endpoint: "http://localhost:11434".to_string(),
                model: "llama3.2:3b".to_string(),
                target_language: "en".to_string(),
                timeout_secs: 300,
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| VidlocError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| VidlocError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Validate the tunable silence parameters before a run.
    pub fn validate(&self) -> Result<()> {
        if !(self.silence.threshold > 0.0 && self.silence.threshold < 1.0) {
            return Err(VidlocError::Config(format!(
                "threshold must be in (0, 1), got {}",
                self.silence.threshold
            )));
        }
        if self.silence.min_silence_duration <= 0.0 {
            return Err(VidlocError::Config(format!(
                "min_silence_duration must be positive, got {}",
                self.silence.min_silence_duration
            )));
        }
        if !(self.silence.silent_window_ratio > 0.0 && self.silence.silent_window_ratio <= 1.0) {
            return Err(VidlocError::Config(format!(
                "silent_window_ratio must be in (0, 1], got {}",
                self.silence.silent_window_ratio
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!((config.silence.threshold - 0.01).abs() < f32::EPSILON);
        assert!((config.silence.min_silence_duration - 1.0).abs() < f64::EPSILON);
        assert!((config.silence.silent_window_ratio - 0.8).abs() < f32::EPSILON);
        assert_eq!(config.media.binary_path, "ffmpeg");
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_threshold() {
        let mut config = Config::default();
        config.silence.threshold = 1.5;
        assert!(config.validate().is_err());

        config.silence.threshold = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let mut config = Config::default();
        config.silence.min_silence_duration = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_window_ratio() {
        let mut config = Config::default();
        config.silence.silent_window_ratio = 0.0;
        assert!(config.validate().is_err());

        config.silence.silent_window_ratio = 1.5;
        assert!(config.validate().is_err());

        config.silence.silent_window_ratio = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_silence_section_fills_defaults() {
        let silence: SilenceConfig = toml::from_str("threshold = 0.02").unwrap();
        assert!((silence.threshold - 0.02).abs() < f32::EPSILON);
        assert!((silence.min_silence_duration - 1.0).abs() < f64::EPSILON);
        assert!((silence.silent_window_ratio - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.translate.endpoint, config.translate.endpoint);
        assert_eq!(parsed.transcriber.model, config.transcriber.model);
    }
}
