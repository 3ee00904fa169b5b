//! Time types for room calendars.
//!
//! This module provides [`TimeWindow`] for defining the query range of a
//! fetch cycle, plus the time-of-day rendering used for "booked until"
//! labels and the cosmetic wall clock.

use std::fmt;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// How far ahead a fetch looks when no explicit window is given.
///
/// Occupancy and featured-event data are only ever derived from events
/// inside this horizon.
pub const DEFAULT_LOOKAHEAD_HOURS: i64 = 48;

/// A time window for querying calendar events.
///
/// Represents a half-open interval `[start, end)` in UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window (exclusive).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(start <= end, "TimeWindow start must be <= end");
        Self { start, end }
    }

    /// Creates a window starting at `now` extending the given duration.
    pub fn from_now(now: DateTime<Utc>, duration: Duration) -> Self {
        Self::new(now, now + duration)
    }

    /// Creates the default fetch window: `now` through 48 hours later.
    pub fn lookahead(now: DateTime<Utc>) -> Self {
        Self::from_now(now, Duration::hours(DEFAULT_LOOKAHEAD_HOURS))
    }

    /// Returns the duration of this window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Checks if a datetime falls within this window.
    ///
    /// Uses half-open interval semantics: `[start, end)`.
    pub fn contains(&self, dt: DateTime<Utc>) -> bool {
        self.start <= dt && dt < self.end
    }

    /// Checks if an event interval overlaps this window.
    ///
    /// An event overlaps if it starts before the window ends AND ends after
    /// the window starts.
    pub fn overlaps(&self, event_start: DateTime<Utc>, event_end: DateTime<Utc>) -> bool {
        event_start < self.end && event_end > self.start
    }
}

/// Renders an instant as an `HH:MM` time-of-day string in the given zone.
///
/// This is the format used for "Booked until 10:00" and the displayed clock.
pub fn format_time_of_day<Tz: TimeZone>(dt: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: fmt::Display,
{
    dt.with_timezone(tz).format("%H:%M").to_string()
}
