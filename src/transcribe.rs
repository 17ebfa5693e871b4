use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::info;

use crate::config::TranscriberConfig;
use crate::error::{Result, VidlocError};
use crate::subtitle::{write_srt, SubtitleEntry};

/// Whisper JSON output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperOutput {
    pub text: String,
    pub segments: Vec<WhisperSegment>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Speech-to-subtitle stage backed by an external whisper CLI
pub struct Transcriber {
    config: TranscriberConfig,
}

impl Transcriber {
    pub fn new(config: TranscriberConfig) -> Self {
        Self { config }
    }

    /// Transcribe a video or audio file into subtitle entries
    pub async fn transcribe(&self, input_path: &Path) -> Result<Vec<SubtitleEntry>> {
        if !input_path.exists() {
            return Err(VidlocError::FileNotFound(input_path.display().to_string()));
        }

        info!(
            "Transcribing {} with model '{}'",
            input_path.display(),
            self.config.model
        );

        // Temporary output directory for the whisper JSON
        let temp_dir = tempfile::tempdir()
            .map_err(|e| VidlocError::Transcriber(format!("Failed to create temp directory: {}", e)))?;
        let output_dir = temp_dir.path();

        let mut cmd = Command::new(&self.config.binary_path);
        cmd.arg(input_path)
            .arg("--model").arg(&self.config.model)
            .arg("--output_dir").arg(output_dir)
            .arg("--output_format").arg("json");

        if !self.config.language.is_empty() {
            cmd.arg("--language").arg(&self.config.language);
        }

        let output = cmd
            .output()
            .map_err(|e| VidlocError::Transcriber(format!("Failed to execute whisper: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VidlocError::Transcriber(format!("Whisper failed: {}", stderr)));
        }

        let input_stem = input_path
            .file_stem()
            .ok_or_else(|| VidlocError::Transcriber("invalid input filename".to_string()))?;
        let json_file = output_dir.join(format!("{}.json", input_stem.to_string_lossy()));

        let json_content = std::fs::read_to_string(&json_file)
            .map_err(|e| VidlocError::Transcriber(format!("Failed to read whisper output: {}", e)))?;

        let whisper_output: WhisperOutput = serde_json::from_str(&json_content)
            .map_err(|e| VidlocError::Transcriber(format!("Failed to parse whisper JSON: {}", e)))?;

        Ok(map_segments(whisper_output))
    }

    /// Transcribe and write the result as `<stem>.srt` next to the input,
    /// or to an explicit output path.
    pub async fn transcribe_to_srt(
        &self,
        input_path: &Path,
        output_path: Option<&Path>,
    ) -> Result<PathBuf> {
        let entries = self.transcribe(input_path).await?;

        let srt_path = match output_path {
            Some(path) => path.to_path_buf(),
            None => input_path.with_extension("srt"),
        };

        write_srt(&entries, &srt_path).await?;
        info!("Subtitles written to {}", srt_path.display());

        Ok(srt_path)
    }
}

fn map_segments(output: WhisperOutput) -> Vec<SubtitleEntry> {
    output
        .segments
        .into_iter()
        .enumerate()
        .map(|(i, seg)| SubtitleEntry {
            index: i + 1,
            start: seg.start,
            end: seg.end,
            text: seg.text.trim().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_segments_reindexes_and_trims() {
        let output = WhisperOutput {
            text: "hola que tal".to_string(),
            language: Some("es".to_string()),
            segments: vec![
                WhisperSegment {
                    start: 0.0,
                    end: 1.5,
                    text: " hola ".to_string(),
                },
                WhisperSegment {
                    start: 1.5,
                    end: 3.0,
                    text: " que tal".to_string(),
                },
            ],
        };

        let entries = map_segments(output);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].index, 1);
        assert_eq!(entries[0].text, "hola");
        assert_eq!(entries[1].index, 2);
        assert!((entries[1].end - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_whisper_json_parsing() {
        let json = r#"{"text": "hi", "segments": [{"start": 0.0, "end": 2.0, "text": "hi"}], "language": "en"}"#;
        let parsed: WhisperOutput = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.segments.len(), 1);
        assert_eq!(parsed.language.as_deref(), Some("en"));
    }
}
