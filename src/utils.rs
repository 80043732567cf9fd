// Utility functions
use chrono::{DateTime, Utc};

/// Rounds a value to the given number of decimal places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Formats the as-of stamp of a bar: date-time for intraday intervals,
/// date only for daily and coarser.
pub fn format_as_of(ts: DateTime<Utc>, interval: &str) -> String {
    if is_intraday(interval) {
        ts.format("%Y-%m-%d %H:%M").to_string()
    } else {
        ts.format("%Y-%m-%d").to_string()
    }
}

/// Intraday intervals are minute-based ("1m".."90m") or hour-based ("1h").
/// "1mo"/"3mo" are monthly, not minutes.
pub fn is_intraday(interval: &str) -> bool {
    (interval.ends_with('m') && !interval.ends_with("mo")) || interval.ends_with('h')
}
