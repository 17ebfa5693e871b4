use thiserror::Error;

#[derive(Error, Debug)]
pub enum VidlocError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WAV decoding error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Media load error: {0}")]
    MediaLoad(String),

    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Transcription error: {0}")]
    Transcriber(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Subtitle format error: {0}")]
    Subtitle(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

pub type Result<T> = std::result::Result<T, VidlocError>;
