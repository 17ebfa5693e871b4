//! Silence removal: the core stage of the pipeline.
//!
//! A video's audio track is resampled to 44.1 kHz mono, normalized, and
//! classified sample by sample against an amplitude threshold. Fixed-length
//! windows aggregate the per-sample flags, contiguous voiced windows become
//! keep-intervals, and the matching video segments are cut and concatenated
//! into `<stem>_no_silence.<ext>`.

pub mod classify;
pub mod remover;
pub mod segment;
pub mod waveform;

pub use classify::{silence_mask, Acceleration, ClassifyBackend, FALLBACK_CODEC};
pub use remover::{derive_output_path, SilenceRemover, OUTPUT_SUFFIX};
pub use segment::{keep_intervals, kept_duration, KeepInterval};
pub use waveform::{Waveform, ANALYSIS_SAMPLE_RATE};
