//! Human-readable rendering shared by the CLI reports.

use chrono::{DateTime, Duration, Utc};

const BYTE_UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];

/// Ages at or beyond this print as a date instead.
const MAX_RELATIVE_DAYS: i64 = 30;

pub fn bytes(n: u64) -> String {
    let mut value = n as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < BYTE_UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", n)
    } else {
        format!("{:.1} {}", value, BYTE_UNITS[unit])
    }
}

/// How long before `now` the time `at` was, e.g. `3 hours ago`.
///
/// Times in the future or older than a month print as [`timestamp`].
pub fn age(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(at);
    if elapsed < Duration::zero() || elapsed.num_days() >= MAX_RELATIVE_DAYS {
        return timestamp(at);
    }

    let (n, unit) = match (elapsed.num_days(), elapsed.num_hours(), elapsed.num_minutes()) {
        (0, 0, 0) => return "just now".to_string(),
        (0, 0, mins) => (mins, "min"),
        (0, hours, _) => (hours, "hour"),
        (days, _, _) => (days, "day"),
    };
    format!("{} {}{} ago", n, unit, if n == 1 { "" } else { "s" })
}

/// [`age`] measured against the current clock.
pub fn age_now(at: DateTime<Utc>) -> String {
    age(at, Utc::now())
}

pub fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}
