//! Time-related utilities with clock abstraction for testability.

use chrono::{DateTime, Local, Utc};

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Current instant in UTC
    fn now(&self) -> DateTime<Utc>;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed clock implementation for testing (returns a fixed time)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_time: DateTime<Utc>,
}

impl FixedClock {
    /// Create a new fixed clock with the given instant
    pub fn new(fixed_time: DateTime<Utc>) -> Self {
        Self { fixed_time }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.fixed_time
    }
}

/// Convert an instant to an RFC 3339 string in the local time zone
pub fn to_local_rfc3339(instant: DateTime<Utc>) -> String {
    instant.with_timezone(&Local).to_rfc3339()
}

/// Describe how long ago `then` happened relative to `now`.
///
/// Instants in the future (clock skew between client and server) are
/// reported as "just now".
pub fn humanize_since(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    let seconds = elapsed.num_seconds();

    if seconds < 60 {
        "just now".to_string()
    } else if seconds < 3600 {
        format!("{} min ago", elapsed.num_minutes())
    } else if seconds < 86_400 {
        format!("{} h ago", elapsed.num_hours())
    } else if elapsed.num_days() == 1 {
        "yesterday".to_string()
    } else {
        then.format("%Y-%m-%d").to_string()
    }
}
