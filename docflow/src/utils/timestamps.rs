//! Clock and timestamp formatting.
//!
//! All wall-clock readings are expressed in a caller-supplied reference
//! offset; no other timezone conversion happens anywhere in the crate.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};

/// Format used for date-like field values.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format used for the generated-at control field.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Represents a timestamp in the reference offset.
pub type Timestamp = DateTime<FixedOffset>;

/// Source of the current time.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    /// Returns the current time in the reference offset.
    fn now(&self) -> Timestamp;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    /// Creates a system clock reporting in the given offset.
    #[must_use]
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Creates a system clock reporting in UTC.
    #[must_use]
    pub fn utc() -> Self {
        Self::new(utc_offset())
    }

    /// Creates a system clock from an offset in minutes east of UTC.
    ///
    /// Returns `None` if the offset is out of range.
    #[must_use]
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        offset_from_minutes(minutes).map(Self::new)
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::utc()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now().with_timezone(&self.offset)
    }
}

/// Clock that always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    at: Timestamp,
}

impl FixedClock {
    /// Creates a clock frozen at `at`.
    #[must_use]
    pub fn new(at: Timestamp) -> Self {
        Self { at }
    }

    /// Creates a clock frozen at a naive local time in UTC.
    #[must_use]
    pub fn at_utc(naive: NaiveDateTime) -> Self {
        Self::new(naive.and_utc().with_timezone(&utc_offset()))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.at
    }
}

/// Builds a fixed offset from minutes east of UTC.
#[must_use]
pub fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}

/// Formats a date as `yyyy-MM-dd`.
#[must_use]
pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Formats a timestamp as `yyyy-MM-dd HH:mm:ss` in its own offset.
#[must_use]
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Formats a timestamp as RFC 3339.
#[must_use]
pub fn iso_timestamp(ts: &Timestamp) -> String {
    ts.to_rfc3339()
}
