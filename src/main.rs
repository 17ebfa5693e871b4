//! Vidloc - Personal Video Localization Pipeline
//!
//! Main entry point. Each subcommand runs one stage of the pipeline:
//! silence removal, transcription, subtitle translation, or dubbing.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use vidloc::cli::{Args, Commands};
use vidloc::config::Config;
use vidloc::workflow::Workflow;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose)?;

    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Cut {
            input,
            threshold,
            min_silence,
        } => {
            apply_silence_overrides(&mut config, threshold, min_silence);
            let workflow = Workflow::new(config)?;

            info!("Removing silence from: {}", input.display());
            match workflow.cut_silence(&input).await? {
                Some(output) => info!("Output written to {}", output.display()),
                None => info!("Input was fully silent, no output written"),
            }
        }
        Commands::Batch {
            input_dir,
            threshold,
            min_silence,
        } => {
            apply_silence_overrides(&mut config, threshold, min_silence);
            let workflow = Workflow::new(config)?;

            info!("Removing silence from directory: {}", input_dir.display());
            workflow.cut_silence_batch(&input_dir).await?;
        }
        Commands::Transcribe { input, output } => {
            let workflow = Workflow::new(config)?;

            info!("Transcribing: {}", input.display());
            let srt_path = workflow.transcribe(&input, output.as_deref()).await?;
            info!("Subtitles written to {}", srt_path.display());
        }
        Commands::Translate {
            input,
            output,
            target_lang,
        } => {
            let workflow = Workflow::new(config)?;

            info!("Translating subtitles: {}", input.display());
            let srt_path = workflow
                .translate(&input, output.as_deref(), target_lang.as_deref())
                .await?;
            info!("Translated subtitles written to {}", srt_path.display());
        }
        Commands::Dub {
            video,
            audio,
            output,
        } => {
            let workflow = Workflow::new(config)?;

            info!("Dubbing {} with {}", video.display(), audio.display());
            workflow.dub(&video, &audio, &output).await?;
        }
    }

    info!("Done");
    Ok(())
}

fn apply_silence_overrides(config: &mut Config, threshold: Option<f32>, min_silence: Option<f64>) {
    if let Some(threshold) = threshold {
        config.silence.threshold = threshold;
    }
    if let Some(min_silence) = min_silence {
        config.silence.min_silence_duration = min_silence;
    }
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".vidloc").join("log");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = rolling::daily(&log_dir, "vidloc.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_ansi(false);

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer);

    subscriber
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
