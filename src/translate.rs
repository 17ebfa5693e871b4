use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::TranslateConfig;
use crate::error::{Result, VidlocError};
use crate::subtitle::{read_srt, write_srt, SubtitleEntry};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub response: String,
    pub done: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResult {
    pub text: String,
}

/// Subtitle translation stage backed by an Ollama-style endpoint
pub struct Translator {
    client: Client,
    config: TranslateConfig,
}

impl Translator {
    pub fn new(config: TranslateConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(VidlocError::Http)?;

        Ok(Self { client, config })
    }

    /// Translate every entry in place. A failed entry keeps its source text
    /// and does not abort the file.
    pub async fn translate_entries(
        &self,
        entries: &mut [SubtitleEntry],
        target_language: &str,
    ) -> Result<()> {
        info!("Translating {} entries to {}", entries.len(), target_language);

        let total = entries.len();
        for (idx, entry) in entries.iter_mut().enumerate() {
            match self.translate_text(&entry.text, target_language).await {
                Ok(translation) => {
                    info!("[{}/{}] {} -> {}", idx + 1, total, entry.text, translation);
                    entry.text = translation;
                }
                Err(e) => {
                    warn!(
                        "[{}/{}] translation failed, keeping source text: {}",
                        idx + 1,
                        total,
                        e
                    );
                }
            }
        }

        Ok(())
    }

    /// Translate one SRT file and write `<stem>_<lang>.srt`
    pub async fn translate_srt(
        &self,
        input_path: &Path,
        output_path: Option<&Path>,
        target_language: &str,
    ) -> Result<PathBuf> {
        let mut entries = read_srt(input_path).await?;
        self.translate_entries(&mut entries, target_language).await?;

        let srt_path = match output_path {
            Some(path) => path.to_path_buf(),
            None => derive_translated_path(input_path, target_language)?,
        };

        write_srt(&entries, &srt_path).await?;
        info!("Translated subtitles written to {}", srt_path.display());

        Ok(srt_path)
    }

    /// Perform one translation call with JSON-constrained output
    async fn translate_text(&self, text: &str, target_language: &str) -> Result<String> {
        let request = TranslationRequest {
            model: self.config.model.clone(),
            prompt: build_translation_prompt(text, target_language),
            stream: false,
            format: "json".to_string(),
        };

        let url = format!("{}/api/generate", self.config.endpoint);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(VidlocError::Http)?;

        if !response.status().is_success() {
            return Err(VidlocError::Translation(format!(
                "translation endpoint returned HTTP {}",
                response.status()
            )));
        }

        let body: TranslationResponse = response.json().await.map_err(VidlocError::Http)?;
        let result: TranslationResult = serde_json::from_str(&body.response).map_err(|e| {
            VidlocError::Translation(format!("unparseable model response: {}", e))
        })?;

        let translation = result.text.trim().to_string();
        if translation.is_empty() {
            return Err(VidlocError::Translation("model returned empty text".to_string()));
        }

        Ok(translation)
    }

    /// Verify the endpoint answers before starting a long run
    pub async fn check_availability(&self) -> Result<()> {
        let url = format!("{}/api/tags", self.config.endpoint);
        let response = self.client.get(&url).send().await.map_err(VidlocError::Http)?;

        if response.status().is_success() {
            info!("Translation endpoint is available");
            Ok(())
        } else {
            Err(VidlocError::Translation(format!(
                "translation endpoint unavailable: HTTP {}",
                response.status()
            )))
        }
    }
}

fn build_translation_prompt(text: &str, target_language: &str) -> String {
    format!(
        "Translate the following subtitle text to {}. \
         Keep it natural and concise; it must fit a subtitle. \
         Respond with JSON of the form {{\"text\": \"<translation>\"}} and nothing else.\n\
         Text: {}",
        target_language, text
    )
}

/// Sibling path `<stem>_<lang>.srt`
pub fn derive_translated_path(input_path: &Path, target_language: &str) -> Result<PathBuf> {
    let stem = input_path
        .file_stem()
        .ok_or_else(|| VidlocError::Subtitle("input has no file name".to_string()))?
        .to_string_lossy();

    Ok(input_path.with_file_name(format!("{}_{}.srt", stem, target_language)))
}
