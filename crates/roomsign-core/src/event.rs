//! Event types for room calendars.
//!
//! This module provides:
//! - [`RoomEvent`]: one calendar occurrence on a room calendar
//! - [`EventBoundary`]: a start/end boundary that is either a precise
//!   timestamp or an all-day date
//! - [`EventStatus`]: confirmed / tentative / cancelled
//!
//! Boundaries keep the shape providers send: a `dateTime` with offset, or a
//! bare `date` for all-day events. A boundary with neither form is tolerated
//! (malformed input); it simply has no effective instant.

use chrono::{DateTime, FixedOffset, LocalResult, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// The lifecycle status of a calendar event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// The event is confirmed.
    #[default]
    Confirmed,
    /// The event is tentatively scheduled.
    Tentative,
    /// The event was cancelled.
    Cancelled,
}

impl EventStatus {
    /// Parses a provider status string, degrading unknown values to
    /// `Confirmed` rather than rejecting the event.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("cancelled") {
            Self::Cancelled
        } else if s.eq_ignore_ascii_case("tentative") {
            Self::Tentative
        } else {
            Self::Confirmed
        }
    }
}

/// One side of an event interval, as calendar providers send it.
///
/// Exactly one of `date_time` / `date` is populated on well-formed input.
/// Both absent is a malformed boundary: it resolves to no instant, so the
/// event fails containment checks, but it still appears in display lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventBoundary {
    /// A precise timestamp with offset (RFC3339 on the wire).
    #[serde(rename = "dateTime", skip_serializing_if = "Option::is_none")]
    pub date_time: Option<DateTime<FixedOffset>>,
    /// An all-day date (no time of day, interpreted in the local zone).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// IANA zone identifier accompanying `date_time`, when the provider
    /// sends one. Informational; the offset in `date_time` is authoritative.
    #[serde(rename = "timeZone", skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventBoundary {
    /// Creates a timed boundary from a UTC instant.
    pub fn timed(dt: DateTime<Utc>) -> Self {
        Self {
            date_time: Some(dt.fixed_offset()),
            date: None,
            time_zone: None,
        }
    }

    /// Creates an all-day boundary.
    pub fn all_day(date: NaiveDate) -> Self {
        Self {
            date_time: None,
            date: Some(date),
            time_zone: None,
        }
    }

    /// Creates a boundary with neither form populated.
    pub fn missing() -> Self {
        Self::default()
    }

    /// Returns true if this boundary is an all-day date.
    pub fn is_all_day(&self) -> bool {
        self.date_time.is_none() && self.date.is_some()
    }

    /// Returns true if neither form is populated.
    pub fn is_missing(&self) -> bool {
        self.date_time.is_none() && self.date.is_none()
    }

    /// Resolves the boundary's *effective instant*.
    ///
    /// A timestamp resolves to itself; an all-day date resolves to its local
    /// midnight in `tz`. A missing boundary, or a date whose local midnight
    /// does not exist (DST gap), resolves to `None`. Never panics.
    pub fn resolve_in<Tz: TimeZone>(&self, tz: &Tz) -> Option<DateTime<Utc>> {
        if let Some(dt) = self.date_time {
            return Some(dt.with_timezone(&Utc));
        }
        let midnight = self.date?.and_hms_opt(0, 0, 0)?;
        match tz.from_local_datetime(&midnight) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => {
                Some(dt.with_timezone(&Utc))
            }
            LocalResult::None => None,
        }
    }
}

/// One calendar occurrence on a room calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomEvent {
    /// Opaque identifier, unique within a calendar.
    pub id: String,
    /// The event status.
    #[serde(default)]
    pub status: EventStatus,
    /// When the event starts.
    pub start: EventBoundary,
    /// When the event ends.
    pub end: EventBoundary,
    /// Human-readable title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Longer human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RoomEvent {
    /// Creates a new event with the required fields.
    pub fn new(id: impl Into<String>, start: EventBoundary, end: EventBoundary) -> Self {
        Self {
            id: id.into(),
            status: EventStatus::Confirmed,
            start,
            end,
            summary: None,
            description: None,
        }
    }

    /// Builder method to set the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder method to set the status.
    pub fn with_status(mut self, status: EventStatus) -> Self {
        self.status = status;
        self
    }

    /// The label shown for this event: summary, else description, else a
    /// placeholder.
    pub fn display_label(&self) -> &str {
        non_empty(self.summary.as_deref())
            .or_else(|| non_empty(self.description.as_deref()))
            .unwrap_or("No title")
    }

    /// Returns true if the event was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.status == EventStatus::Cancelled
    }

    /// The effective start instant, if the start boundary resolves.
    pub fn effective_start<Tz: TimeZone>(&self, tz: &Tz) -> Option<DateTime<Utc>> {
        self.start.resolve_in(tz)
    }

    /// The effective end instant, if the end boundary resolves.
    pub fn effective_end<Tz: TimeZone>(&self, tz: &Tz) -> Option<DateTime<Utc>> {
        self.end.resolve_in(tz)
    }

    /// Checks whether this event's interval contains `now`.
    ///
    /// The start is inclusive. A timed end is inclusive as well; an all-day
    /// end is exclusive, because an all-day end date names the *following*
    /// day (an event ending on date 2024-01-02 is over once 2024-01-02
    /// begins locally). Either boundary failing to resolve fails the check.
    pub fn occupies_at<Tz: TimeZone>(&self, now: DateTime<Utc>, tz: &Tz) -> bool {
        let (Some(start), Some(end)) = (self.effective_start(tz), self.effective_end(tz)) else {
            return false;
        };
        if now < start {
            return false;
        }
        if self.end.is_all_day() {
            now < end
        } else {
            now <= end
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    mod status {
        use super::*;

        #[test]
        fn parse_known_values() {
            assert_eq!(EventStatus::parse("confirmed"), EventStatus::Confirmed);
            assert_eq!(EventStatus::parse("tentative"), EventStatus::Tentative);
            assert_eq!(EventStatus::parse("cancelled"), EventStatus::Cancelled);
            assert_eq!(EventStatus::parse("CANCELLED"), EventStatus::Cancelled);
        }

        #[test]
        fn parse_unknown_degrades_to_confirmed() {
            assert_eq!(EventStatus::parse("draft"), EventStatus::Confirmed);
            assert_eq!(EventStatus::parse(""), EventStatus::Confirmed);
        }

        #[test]
        fn serde_lowercase() {
            let json = serde_json::to_string(&EventStatus::Cancelled).unwrap();
            assert_eq!(json, "\"cancelled\"");
        }
    }

    mod boundary {
        use super::*;

        #[test]
        fn timed_resolves_to_itself() {
            let instant = utc(2024, 1, 1, 9, 0, 0);
            let boundary = EventBoundary::timed(instant);
            assert!(!boundary.is_all_day());
            assert!(!boundary.is_missing());
            assert_eq!(boundary.resolve_in(&Utc), Some(instant));
        }

        #[test]
        fn timed_resolution_ignores_query_zone() {
            let instant = utc(2024, 1, 1, 9, 0, 0);
            let boundary = EventBoundary::timed(instant);
            let plus_five = FixedOffset::east_opt(5 * 3600).unwrap();
            assert_eq!(boundary.resolve_in(&plus_five), Some(instant));
        }

        #[test]
        fn all_day_resolves_to_local_midnight() {
            let boundary = EventBoundary::all_day(date(2024, 1, 1));
            assert!(boundary.is_all_day());

            assert_eq!(boundary.resolve_in(&Utc), Some(utc(2024, 1, 1, 0, 0, 0)));

            // Local midnight in UTC+2 is 22:00 UTC the previous day.
            let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
            assert_eq!(
                boundary.resolve_in(&plus_two),
                Some(utc(2023, 12, 31, 22, 0, 0))
            );
        }

        #[test]
        fn missing_resolves_to_none() {
            let boundary = EventBoundary::missing();
            assert!(boundary.is_missing());
            assert_eq!(boundary.resolve_in(&Utc), None);
        }

        #[test]
        fn wire_format_uses_camel_case() {
            let boundary = EventBoundary::timed(utc(2024, 1, 1, 9, 0, 0));
            let json = serde_json::to_value(&boundary).unwrap();
            assert!(json.get("dateTime").is_some());
            assert!(json.get("date").is_none());
        }

        #[test]
        fn parses_provider_payloads() {
            let timed: EventBoundary =
                serde_json::from_str(r#"{"dateTime":"2024-01-01T09:00:00+02:00","timeZone":"Europe/Helsinki"}"#)
                    .unwrap();
            assert_eq!(timed.resolve_in(&Utc), Some(utc(2024, 1, 1, 7, 0, 0)));
            assert_eq!(timed.time_zone.as_deref(), Some("Europe/Helsinki"));

            let all_day: EventBoundary = serde_json::from_str(r#"{"date":"2024-01-01"}"#).unwrap();
            assert!(all_day.is_all_day());

            let empty: EventBoundary = serde_json::from_str("{}").unwrap();
            assert!(empty.is_missing());
        }
    }

    mod room_event {
        use super::*;

        fn timed_event(start: DateTime<Utc>, end: DateTime<Utc>) -> RoomEvent {
            RoomEvent::new("evt-1", EventBoundary::timed(start), EventBoundary::timed(end))
        }

        #[test]
        fn containment_is_inclusive_for_timed_ends() {
            let event = timed_event(utc(2024, 1, 1, 9, 0, 0), utc(2024, 1, 1, 10, 0, 0));

            assert!(!event.occupies_at(utc(2024, 1, 1, 8, 59, 59), &Utc));
            assert!(event.occupies_at(utc(2024, 1, 1, 9, 0, 0), &Utc));
            assert!(event.occupies_at(utc(2024, 1, 1, 9, 30, 0), &Utc));
            assert!(event.occupies_at(utc(2024, 1, 1, 10, 0, 0), &Utc));
            assert!(!event.occupies_at(utc(2024, 1, 1, 10, 0, 1), &Utc));
        }

        #[test]
        fn all_day_occupies_the_whole_day() {
            let event = RoomEvent::new(
                "evt-2",
                EventBoundary::all_day(date(2024, 1, 1)),
                EventBoundary::all_day(date(2024, 1, 2)),
            );

            assert!(event.occupies_at(utc(2024, 1, 1, 0, 0, 0), &Utc));
            assert!(event.occupies_at(utc(2024, 1, 1, 12, 0, 0), &Utc));
            assert!(event.occupies_at(utc(2024, 1, 1, 23, 59, 59), &Utc));
            // The end date names the following day, so its first instant is
            // already outside the event.
            assert!(!event.occupies_at(utc(2024, 1, 2, 0, 0, 0), &Utc));
            assert!(!event.occupies_at(utc(2024, 1, 2, 8, 0, 0), &Utc));
        }

        #[test]
        fn missing_boundary_never_occupies() {
            let event = RoomEvent::new(
                "evt-3",
                EventBoundary::timed(utc(2024, 1, 1, 9, 0, 0)),
                EventBoundary::missing(),
            );
            assert!(!event.occupies_at(utc(2024, 1, 1, 9, 30, 0), &Utc));
        }

        #[test]
        fn display_label_falls_back() {
            let event = timed_event(utc(2024, 1, 1, 9, 0, 0), utc(2024, 1, 1, 10, 0, 0));
            assert_eq!(event.display_label(), "No title");

            let event = event.with_description("Weekly sync");
            assert_eq!(event.display_label(), "Weekly sync");

            let event = event.with_summary("Standup");
            assert_eq!(event.display_label(), "Standup");
        }

        #[test]
        fn blank_summary_is_skipped() {
            let event = timed_event(utc(2024, 1, 1, 9, 0, 0), utc(2024, 1, 1, 10, 0, 0))
                .with_summary("   ")
                .with_description("Planning");
            assert_eq!(event.display_label(), "Planning");
        }

        #[test]
        fn serde_roundtrip() {
            let event = timed_event(utc(2024, 1, 1, 9, 0, 0), utc(2024, 1, 1, 10, 0, 0))
                .with_summary("Standup")
                .with_status(EventStatus::Tentative);

            let json = serde_json::to_string(&event).unwrap();
            let parsed: RoomEvent = serde_json::from_str(&json).unwrap();
            assert_eq!(event, parsed);
        }
    }
}
