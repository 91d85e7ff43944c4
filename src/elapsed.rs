//! Wall-clock access and human-readable wait times.
//!
//! The queue never calls `Utc::now()` directly. It asks a [`Clock`], so the
//! periodic wait-time refresh can be driven deterministically in tests.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

const MINUTES_IN_DAY: i64 = 1_440;
const MINUTES_IN_MONTH: i64 = 43_200;
const MINUTES_IN_TWO_MONTHS: i64 = 86_400;

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Cloned handles share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    /// Jump to an absolute instant.
    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Describe the distance between two instants in words.
///
/// Rounds to the nearest minute and then walks the same buckets people use
/// when reading a queue board: "less than a minute", "5 minutes",
/// "about 2 hours", "3 days", "about 1 month", "over 1 year".
/// An instant in the future of `to` reads as "less than a minute".
///
/// A month is a fixed 30-day block rather than a calendar month, so near
/// month ends the label can differ by one from calendar-based formatters.
pub fn format_distance(from: DateTime<Utc>, to: DateTime<Utc>) -> String {
    let seconds = to.signed_duration_since(from).num_seconds().max(0);
    let minutes = (seconds + 30) / 60;

    if minutes == 0 {
        return "less than a minute".to_string();
    }
    if minutes < 2 {
        return "1 minute".to_string();
    }
    if minutes < 45 {
        return format!("{} minutes", minutes);
    }
    if minutes < 90 {
        return "about 1 hour".to_string();
    }
    if minutes < MINUTES_IN_DAY {
        let hours = (minutes + 30) / 60;
        return format!("about {} hours", hours);
    }
    if minutes < 2_520 {
        return "1 day".to_string();
    }
    if minutes < MINUTES_IN_MONTH {
        let days = (minutes + MINUTES_IN_DAY / 2) / MINUTES_IN_DAY;
        return format!("{} days", days);
    }
    if minutes < MINUTES_IN_TWO_MONTHS {
        let months = (minutes + MINUTES_IN_MONTH / 2) / MINUTES_IN_MONTH;
        return format!("about {}", plural(months, "month"));
    }

    let months = minutes / MINUTES_IN_MONTH;
    if months < 12 {
        let nearest = ((minutes + MINUTES_IN_MONTH / 2) / MINUTES_IN_MONTH).max(1);
        return plural(nearest, "month");
    }

    let years = months / 12;
    match months % 12 {
        0..=2 => format!("about {}", plural(years, "year")),
        3..=8 => format!("over {}", plural(years, "year")),
        _ => format!("almost {}", plural(years + 1, "year")),
    }
}

/// Describe how long ago `since` was, according to `clock`.
pub fn format_distance_since(since: DateTime<Utc>, clock: &dyn Clock) -> String {
    format_distance(since, clock.now())
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}
