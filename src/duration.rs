//! Clock-style rendering of media durations.

/// Formats a duration in milliseconds as `MM:SS`, or `HH:MM:SS` once it reaches an hour.
///
/// Non-positive durations render as `00:00`. Hours wrap at 24, so a 25 hour duration reads
/// `01:00:00`.
pub fn format_duration(duration_ms: i64) -> String {
    if duration_ms <= 0 {
        return String::from("00:00");
    }

    let seconds = (duration_ms / 1000) % 60;
    let minutes = (duration_ms / (1000 * 60)) % 60;
    let hours = (duration_ms / (1000 * 60 * 60)) % 24;

    if hours == 0 {
        format!("{minutes:02}:{seconds:02}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }
}

/// [`format_duration`] for a position in (fractional) seconds.
pub fn format_seconds(seconds: f64) -> String {
    if !seconds.is_finite() {
        return format_duration(0);
    }
    format_duration((seconds * 1000.0) as i64)
}
