use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Remove silent spans from a single video file
    Cut {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Amplitude threshold below which a sample counts as silent
        #[arg(short, long)]
        threshold: Option<f32>,

        /// Silence window size in seconds
        #[arg(short, long)]
        min_silence: Option<f64>,
    },

    /// Remove silent spans from every video in a directory
    Batch {
        /// Input directory containing video files
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Amplitude threshold below which a sample counts as silent
        #[arg(short, long)]
        threshold: Option<f32>,

        /// Silence window size in seconds
        #[arg(short, long)]
        min_silence: Option<f64>,
    },

    /// Transcribe a video into an SRT subtitle file
    Transcribe {
        /// Input video or audio file
        #[arg(short, long)]
        input: PathBuf,

        /// Output SRT file (defaults to <stem>.srt next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Translate an SRT subtitle file
    Translate {
        /// Input SRT file
        #[arg(short, long)]
        input: PathBuf,

        /// Output SRT file (defaults to <stem>_<lang>.srt)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Target language code
        #[arg(short, long)]
        target_lang: Option<String>,
    },

    /// Replace a video's audio track with an external audio file
    Dub {
        /// Input video file
        #[arg(long)]
        video: PathBuf,

        /// Replacement audio file
        #[arg(long)]
        audio: PathBuf,

        /// Output video file
        #[arg(short, long)]
        output: PathBuf,
    },
}
