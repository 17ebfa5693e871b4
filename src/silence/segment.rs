use tracing::debug;

/// A maximal span of time that must survive in the output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeepInterval {
    pub start: f64,
    pub end: f64,
}

impl KeepInterval {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Derive keep-intervals from the per-sample silence mask.
///
/// The mask is partitioned into fixed windows of
/// `sample_rate * min_silence_duration` samples; a trailing partial window
/// is not analyzed. A window counts as silent when at least
/// `silent_window_ratio` of its samples are flagged. Scanning left to
/// right, each silent window closes the open interval (if non-empty) and
/// the next candidate opens at that window's end.
///
/// Any time left between the last opened candidate and `duration` is kept
/// unconditionally, even when the trailing windows were silent. Trailing
/// moments are never lost; see the tail-keep test below.
pub fn keep_intervals(
    mask: &[bool],
    sample_rate: u32,
    min_silence_duration: f64,
    silent_window_ratio: f32,
    duration: f64,
) -> Vec<KeepInterval> {
    let window_size = (sample_rate as f64 * min_silence_duration) as usize;
    if window_size == 0 {
        return Vec::new();
    }

    let num_windows = mask.len() / window_size;
    let mut intervals = Vec::new();
    let mut start_time = 0.0f64;

    for i in 0..num_windows {
        let window = &mask[i * window_size..(i + 1) * window_size];
        let silent_fraction =
            window.iter().filter(|&&s| s).count() as f32 / window_size as f32;

        if silent_fraction < silent_window_ratio {
            // Voiced window, current candidate keeps growing
            continue;
        }

        let window_start = (i * window_size) as f64 / sample_rate as f64;
        if start_time < window_start {
            intervals.push(KeepInterval {
                start: start_time,
                end: window_start,
            });
        }
        start_time = ((i + 1) * window_size) as f64 / sample_rate as f64;
    }

    if start_time < duration {
        intervals.push(KeepInterval {
            start: start_time,
            end: duration,
        });
    }

    debug!(
        "Derived {} keep-interval(s) from {} window(s), {:.1}s of {:.1}s kept",
        intervals.len(),
        num_windows,
        kept_duration(&intervals),
        duration
    );

    intervals
}

/// Total seconds covered by the intervals
pub fn kept_duration(intervals: &[KeepInterval]) -> f64 {
    intervals.iter().map(|iv| iv.duration()).sum()
}
