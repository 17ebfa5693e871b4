use std::path::Path;
use tokio::fs;
use tracing::info;

use crate::error::{Result, VidlocError};

/// One subtitle record: sequence index, timing in seconds, text
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleEntry {
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Write entries as an SRT file
pub async fn write_srt<P: AsRef<Path>>(entries: &[SubtitleEntry], output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    info!("Writing SRT file: {}", output_path.display());

    let mut srt_content = String::new();

    for (index, entry) in entries.iter().enumerate() {
        let start_time = format_srt_time(entry.start);
        let end_time = format_srt_time(entry.end);

        srt_content.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            index + 1,
            start_time,
            end_time,
            entry.text.trim()
        ));
    }

    fs::write(output_path, srt_content).await?;

    info!("SRT file written ({} entries)", entries.len());
    Ok(())
}

/// Read an SRT file into entries, sorted by start time
pub async fn read_srt<P: AsRef<Path>>(input_path: P) -> Result<Vec<SubtitleEntry>> {
    let input_path = input_path.as_ref();
    let content = fs::read_to_string(input_path).await?;

    let mut entries = parse_srt(&content)?;
    entries.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap_or(std::cmp::Ordering::Equal));

    info!("Parsed {} subtitle entries from {}", entries.len(), input_path.display());
    Ok(entries)
}

/// Parse SRT content: index line, timestamp line, text lines, blank separator
pub fn parse_srt(content: &str) -> Result<Vec<SubtitleEntry>> {
    // External tools commonly write CRLF line endings; normalize before
    // splitting on blank lines or the blocks never separate.
    let content = content.replace("\r\n", "\n");
    let mut entries = Vec::new();

    for block in content.split("\n\n").map(str::trim) {
        if block.is_empty() {
            continue;
        }

        let mut lines = block.lines();
        let index_line = lines
            .next()
            .ok_or_else(|| VidlocError::Subtitle("empty subtitle block".to_string()))?;
        let index: usize = index_line.trim().parse().map_err(|_| {
            VidlocError::Subtitle(format!("invalid sequence index '{}'", index_line))
        })?;

        let timing_line = lines
            .next()
            .ok_or_else(|| VidlocError::Subtitle(format!("block {} has no timing line", index)))?;
        let (start_raw, end_raw) = timing_line.split_once(" --> ").ok_or_else(|| {
            VidlocError::Subtitle(format!("malformed timing line '{}'", timing_line))
        })?;

        let start = parse_srt_time(start_raw.trim())?;
        let end = parse_srt_time(end_raw.trim())?;
        let text = lines.collect::<Vec<_>>().join("\n").trim().to_string();

        entries.push(SubtitleEntry {
            index,
            start,
            end,
            text,
        });
    }

    Ok(entries)
}

/// Format time in seconds to SRT time format (HH:MM:SS,mmm)
pub fn format_srt_time(seconds: f64) -> String {
    let total_milliseconds = (seconds * 1000.0) as u64;
    let hours = total_milliseconds / 3_600_000;
    let minutes = (total_milliseconds % 3_600_000) / 60_000;
    let secs = (total_milliseconds % 60_000) / 1_000;
    let millis = total_milliseconds % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

/// Parse an SRT timestamp (HH:MM:SS,mmm) into seconds
pub fn parse_srt_time(raw: &str) -> Result<f64> {
    let malformed = || VidlocError::Subtitle(format!("malformed timestamp '{}'", raw));

    let (clock, millis_raw) = raw.split_once(',').ok_or_else(malformed)?;
    let mut clock_parts = clock.split(':');
    let hours: u64 = clock_parts
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or_else(malformed)?;
    let minutes: u64 = clock_parts
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or_else(malformed)?;
    let seconds: u64 = clock_parts
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or_else(malformed)?;
    if clock_parts.next().is_some() {
        return Err(malformed());
    }
    let millis: u64 = millis_raw.parse().map_err(|_| malformed())?;

    Ok((hours * 3600 + minutes * 60 + seconds) as f64 + millis as f64 / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_srt_time() {
        assert_eq!(format_srt_time(0.0), "00:00:00,000");
        assert_eq!(format_srt_time(65.123), "00:01:05,123");
        assert_eq!(format_srt_time(3661.500), "01:01:01,500");
    }

    #[test]
    fn test_parse_srt_time() {
        assert!((parse_srt_time("00:00:00,000").unwrap() - 0.0).abs() < 1e-9);
        assert!((parse_srt_time("00:01:05,123").unwrap() - 65.123).abs() < 1e-9);
        assert!((parse_srt_time("01:01:01,500").unwrap() - 3661.5).abs() < 1e-9);
        assert!(parse_srt_time("65,123").is_err());
        assert!(parse_srt_time("00:01:05.123").is_err());
    }

    #[test]
    fn test_parse_srt_blocks() {
        let content = "1\n00:00:01,000 --> 00:00:02,500\nHola mundo\n\n2\n00:00:03,000 --> 00:00:04,000\nSegunda linea\ncontinuada\n\n";
        let entries = parse_srt(content).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].index, 1);
        assert!((entries[0].start - 1.0).abs() < 1e-9);
        assert!((entries[0].end - 2.5).abs() < 1e-9);
        assert_eq!(entries[0].text, "Hola mundo");
        assert_eq!(entries[1].text, "Segunda linea\ncontinuada");
    }

    #[test]
    fn test_parse_crlf_line_endings() {
        let content = "1\r\n00:00:01,000 --> 00:00:02,000\r\nFirst\r\n\r\n2\r\n00:00:03,000 --> 00:00:04,000\r\nSecond\r\n\r\n";
        let entries = parse_srt(content).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].text, "First");
        assert_eq!(entries[1].index, 2);
        assert_eq!(entries[1].text, "Second");
        assert!((entries[1].start - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_srt("not an srt\nat all\n\n").is_err());
        assert!(parse_srt("1\nmissing arrow line\ntext\n\n").is_err());
    }

    #[tokio::test]
    async fn test_srt_round_trip() {
        let entries = vec![
            SubtitleEntry {
                index: 1,
                start: 0.5,
                end: 2.0,
                text: "First".to_string(),
            },
            SubtitleEntry {
                index: 2,
                start: 2.5,
                end: 4.25,
                text: "Second".to_string(),
            },
        ];

        let temp = tempfile::Builder::new().suffix(".srt").tempfile().unwrap();
        write_srt(&entries, temp.path()).await.unwrap();
        let parsed = read_srt(temp.path()).await.unwrap();

        assert_eq!(parsed, entries);
    }
}
