//! Vidloc - Personal Video Localization Pipeline
//!
//! Four manually-invoked stages against a local folder layout: strip
//! silence from raw recordings, transcribe speech to subtitles, machine
//! translate the subtitles, and splice dubbed audio back onto the video.
//! Media decoding and encoding go through ffmpeg, transcription through a
//! whisper CLI, translation through an Ollama-style endpoint.

pub mod cli;
pub mod config;
pub mod dub;
pub mod error;
pub mod media;
pub mod silence;
pub mod subtitle;
pub mod transcribe;
pub mod translate;
pub mod workflow;
