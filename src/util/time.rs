//! Wall-clock abstraction for cache freshness
//!
//! The record cache compares a file's last-write time against "now". Going
//! through [`Clock`] lets tests pin "now" to an exact instant and check the
//! TTL boundary without sleeping.

use chrono::{DateTime, Utc};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Real wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    /// Pin the clock to `now`
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += chrono::Duration::from_std(by).unwrap_or(chrono::Duration::zero());
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Convert a filesystem timestamp
#[inline]
pub fn to_utc(time: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(time)
}

/// Elapsed time from `earlier` to `now`, zero if `earlier` lies in the future
pub fn age(earlier: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (now - earlier).to_std().unwrap_or(Duration::ZERO)
}

/// Format a duration in human-readable form
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use qsimbench::util::time::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1.50m");
/// assert_eq!(format_duration(Duration::from_secs(7200)), "2.00h");
/// assert_eq!(format_duration(Duration::from_secs(3 * 86400)), "3.00d");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();

    if secs < 1.0 {
        format!("{}ms", duration.as_millis())
    } else if secs < 60.0 {
        format!("{:.2}s", secs)
    } else if secs < 3600.0 {
        format!("{:.2}m", secs / 60.0)
    } else if secs < 86400.0 {
        format!("{:.2}h", secs / 3600.0)
    } else {
        format!("{:.2}d", secs / 86400.0)
    }
}
