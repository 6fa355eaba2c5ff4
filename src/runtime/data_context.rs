use chrono::{Local, Offset};

use crate::types::MILLIS_PER_DAY;

/// What system functions read at run time: who is asking, and one clock
/// snapshot shared by every CURRENT_* / LOCAL* call of an evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataContext {
    pub user: String,
    pub system_user: String,
    /// Milliseconds since the epoch, UTC.
    pub current_timestamp: i64,
    /// Offset of the local time zone from UTC, in milliseconds.
    pub time_zone_offset: i64,
    pub locale: String,
}

impl Default for DataContext {
    fn default() -> Self {
        Self::new()
    }
}

impl DataContext {
    /// Snapshots the wall clock and the local zone.
    pub fn new() -> Self {
        let now = Local::now();
        let offset = now.offset().fix().local_minus_utc() as i64 * 1_000;
        let system_user = std::env::var("USER").unwrap_or_else(|_| "system".to_string());
        Self {
            user: "sa".to_string(),
            system_user,
            current_timestamp: now.timestamp_millis(),
            time_zone_offset: offset,
            locale: "en".to_string(),
        }
    }

    /// A context with a pinned clock.
    pub fn fixed(current_timestamp: i64, time_zone_offset: i64) -> Self {
        Self {
            user: "sa".to_string(),
            system_user: "system".to_string(),
            current_timestamp,
            time_zone_offset,
            locale: "en".to_string(),
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn local_timestamp(&self) -> i64 {
        self.current_timestamp + self.time_zone_offset
    }

    pub fn current_date(&self) -> i64 {
        self.current_timestamp.div_euclid(MILLIS_PER_DAY)
    }

    pub fn current_time(&self) -> i64 {
        self.current_timestamp.rem_euclid(MILLIS_PER_DAY)
    }

    pub fn local_time(&self) -> i64 {
        self.local_timestamp().rem_euclid(MILLIS_PER_DAY)
    }
}
