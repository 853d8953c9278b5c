//! Time formatting and conversion utilities.
//!
//! Lyric timings are `f64` seconds; the playback clock works in
//! [`Duration`]. Conversions here saturate instead of truncating.

use std::time::Duration;

/// Format seconds as `M:SS` (minutes unpadded, seconds zero-padded).
///
/// Negative, NaN and infinite inputs format as `0:00`.
#[must_use]
pub fn format_time(seconds: f64) -> String {
    let total = whole_seconds(seconds);
    format!("{}:{:02}", total / 60, total % 60)
}

/// Floor a seconds value to a whole, non-negative count
fn whole_seconds(seconds: f64) -> u64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    Duration::try_from_secs_f64(seconds).map_or(u64::MAX, |d| d.as_secs())
}

/// Extension trait for Duration/seconds conversions.
pub trait DurationExt {
    /// Convert duration to milliseconds as u64, saturating at `u64::MAX`.
    fn as_millis_u64(&self) -> u64;

    /// Format the duration as `M:SS`.
    fn format_clock(&self) -> String;
}

impl DurationExt for Duration {
    fn as_millis_u64(&self) -> u64 {
        u64::try_from(self.as_millis()).unwrap_or(u64::MAX)
    }

    fn format_clock(&self) -> String {
        format_time(self.as_secs_f64())
    }
}

/// Convert lyric seconds to a [`Duration`], clamping negatives and NaN to zero
#[must_use]
pub fn seconds_to_duration(seconds: f64) -> Duration {
    if seconds.is_nan() || seconds <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
}
