//! Timestamp utilities

use chrono::{DateTime, Local, TimeZone, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Format a timestamp as wall-clock `HH:MM:SS` (24-hour)
///
/// Used for log console line prefixes.
pub fn clock_stamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%H:%M:%S").to_string()
}

/// Current local wall-clock time as `HH:MM:SS`
pub fn local_clock_stamp() -> String {
    clock_stamp(&Local::now())
}

/// Convert milliseconds to duration
pub fn millis_to_duration(millis: u64) -> std::time::Duration {
    std::time::Duration::from_millis(millis)
}
