//! Wall-clock abstraction
//!
//! The operator publishes its sales windows in Korea Standard Time, so the
//! production clock reports KST regardless of the host time zone.

use chrono::{FixedOffset, NaiveDateTime, Offset, Utc};

const KST_OFFSET_SECS: i32 = 9 * 3600;

/// Source of the current operator-local time
pub trait Clock: Send + Sync {
    /// Current local wall-clock time at the operator
    fn now(&self) -> NaiveDateTime;
}

/// Clock reporting the current time in UTC+09:00
#[derive(Debug, Clone, Copy, Default)]
pub struct KstClock;

impl Clock for KstClock {
    fn now(&self) -> NaiveDateTime {
        let offset = FixedOffset::east_opt(KST_OFFSET_SECS).unwrap_or_else(|| Utc.fix());
        Utc::now().with_timezone(&offset).naive_local()
    }
}

/// Clock frozen at a fixed instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Milliseconds since the epoch, used as the cache-busting `_` query parameter
pub fn cache_buster() -> i64 {
    Utc::now().timestamp_millis()
}
