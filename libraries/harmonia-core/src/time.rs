//! Time and percentage formatting
//!
//! Pure helpers shared by the catalog (track durations are stored as `M:SS`)
//! and by playback displays (elapsed / total time, progress bars, volume
//! sliders).

use crate::error::{CoreError, Result};

/// Format seconds as `M:SS`
///
/// Minutes are not capped, so an hour-long track renders as `60:00`.
/// Negative, zero and non-finite inputs render as `0:00`.
pub fn format_time(seconds: f64) -> String {
    let total = whole_seconds(seconds);
    format!("{}:{:02}", total / 60, total % 60)
}

/// Format seconds as `H:MM:SS`, falling back to `M:SS` below one hour
pub fn format_detailed_time(seconds: f64) -> String {
    let total = whole_seconds(seconds);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

/// Parse an `M:SS` string into whole seconds
///
/// # Errors
/// Returns `CoreError::InvalidTimeFormat` unless the input has exactly one
/// colon with numeric minutes and a seconds part below 60, and the total
/// fits in a `u32`.
pub fn parse_time(input: &str) -> Result<u32> {
    let invalid = || CoreError::InvalidTimeFormat(input.to_string());

    let (minutes, seconds) = input.trim().split_once(':').ok_or_else(invalid)?;
    if seconds.contains(':') {
        return Err(invalid());
    }

    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
    let seconds: u32 = seconds.parse().map_err(|_| invalid())?;
    if seconds >= 60 {
        return Err(invalid());
    }

    minutes
        .checked_mul(60)
        .and_then(|total| total.checked_add(seconds))
        .ok_or_else(invalid)
}

/// Playback progress as a percentage in `[0, 100]`
pub fn progress_percent(current: f64, duration: f64) -> f64 {
    if !(duration.is_finite() && duration > 0.0) || !current.is_finite() {
        return 0.0;
    }
    (current / duration * 100.0).clamp(0.0, 100.0)
}

/// Convert a 0-100 slider percentage into a `[0, 1]` volume
pub fn percentage_to_volume(percentage: f64) -> f64 {
    if percentage.is_nan() {
        return 0.0;
    }
    percentage.clamp(0.0, 100.0) / 100.0
}

/// Convert a `[0, 1]` volume into a rounded 0-100 percentage
pub fn volume_to_percentage(volume: f64) -> u8 {
    if volume.is_nan() {
        return 0;
    }
    (volume.clamp(0.0, 1.0) * 100.0).round() as u8
}

fn whole_seconds(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    }
}
