//! Plain-text rendering of results for the command line.

use crate::hyped::HypedArtist;
use crate::partition::Window;
use chrono::DateTime;

/// Formats seconds as `H:MM:SS`. Hours are not wrapped at 24.
#[must_use]
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3_600;
    let minutes = seconds % 3_600 / 60;
    let secs = seconds % 60;
    format!("{hours}:{minutes:02}:{secs:02}")
}

/// `YYYY-MM-DD HH:MM` in UTC, or the raw number if out of range.
#[must_use]
pub fn format_timestamp(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map_or_else(|| timestamp.to_string(), |dt| dt.format("%Y-%m-%d %H:%M").to_string())
}

fn format_span<T>(window: &Window<T>) -> String {
    format!(
        "{} → {}",
        format_timestamp(window.start),
        format_timestamp(window.end)
    )
}

/// One line per window with its listening time.
#[must_use]
pub fn listening_time_lines(windows: &[Window<u64>]) -> Vec<String> {
    windows
        .iter()
        .map(|w| format!("{}  {:>10}", format_span(w), format_duration(w.summary)))
        .collect()
}

/// One line per window naming its hyped artist, or `-`.
#[must_use]
pub fn hyped_lines(windows: &[Window<Option<HypedArtist>>]) -> Vec<String> {
    windows
        .iter()
        .map(|w| match &w.summary {
            Some(h) => format!(
                "{}  {} ({:.1}%, {})",
                format_span(w),
                h.artist,
                h.share * 100.0,
                format_duration(h.length)
            ),
            None => format!("{}  -", format_span(w)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00:00");
        assert_eq!(format_duration(59), "0:00:59");
        assert_eq!(format_duration(3_661), "1:01:01");
        assert_eq!(format_duration(90_000), "25:00:00");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00");
        assert_eq!(format_timestamp(1_703_511_910), "2023-12-25 13:45");
        assert_eq!(format_timestamp(i64::MAX), i64::MAX.to_string());
    }

    #[test]
    fn test_lines() {
        let totals = vec![Window { start: 0, end: 60, summary: 3_725 }];
        assert_eq!(
            listening_time_lines(&totals),
            vec!["1970-01-01 00:00 → 1970-01-01 00:01     1:02:05".to_string()]
        );

        let hyped = vec![
            Window {
                start: 0,
                end: 60,
                summary: Some(HypedArtist {
                    artist: "Grouper".to_string(),
                    length: 600,
                    share: 0.75,
                }),
            },
            Window { start: 60, end: 120, summary: None },
        ];
        let lines = hyped_lines(&hyped);
        assert!(lines[0].ends_with("Grouper (75.0%, 0:10:00)"));
        assert!(lines[1].ends_with("  -"));
    }
}
