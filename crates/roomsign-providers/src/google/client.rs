//! Google Calendar API client.
//!
//! A low-level HTTP client for the Calendar v3 events list endpoint:
//! request building, status mapping, pagination, and conversion of the wire
//! payload into [`RoomEvent`]s.

use std::time::Duration;

use chrono::{DateTime, NaiveDate};
use roomsign_core::{EventBoundary, EventStatus, RoomEvent, TimeWindow};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{SourceError, SourceResult};

/// Base URL for Google Calendar API v3.
const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Google Calendar API client.
#[derive(Debug, Clone)]
pub struct GoogleCalendarClient {
    http_client: reqwest::Client,
}

impl GoogleCalendarClient {
    /// Creates a client with the given request timeout.
    pub fn new(timeout: Duration) -> SourceResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                SourceError::internal("failed to build HTTP client").with_cause(e)
            })?;
        Ok(Self { http_client })
    }

    /// Lists a calendar's events within the window.
    ///
    /// Recurring events are expanded to single occurrences
    /// (`singleEvents=true`) and results are ordered by start time, so the
    /// returned list honors the source contract directly.
    pub async fn list_events(
        &self,
        access_token: &str,
        calendar_id: &str,
        window: &TimeWindow,
    ) -> SourceResult<Vec<RoomEvent>> {
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .list_events_page(access_token, calendar_id, window, page_token.as_deref())
                .await?;

            for wire_event in page.items {
                if let Some(event) = convert_event(wire_event) {
                    events.push(event);
                }
            }

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(calendar_id, count = events.len(), "fetched calendar events");
        Ok(events)
    }

    async fn list_events_page(
        &self,
        access_token: &str,
        calendar_id: &str,
        window: &TimeWindow,
        page_token: Option<&str>,
    ) -> SourceResult<WireEventList> {
        let url = format!(
            "{}/calendars/{}/events",
            CALENDAR_API_BASE,
            urlencoding::encode(calendar_id)
        );

        let mut request = self
            .http_client
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("timeMin", window.start.to_rfc3339()),
                ("timeMax", window.end.to_rfc3339()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ]);

        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::network("request timeout")
            } else if e.is_connect() {
                SourceError::network(format!("connection failed: {}", e))
            } else {
                SourceError::network(format!("request failed: {}", e))
            }
        })?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(SourceError::authentication(
                "access token expired or invalid",
            ));
        }

        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(SourceError::authorization("access denied to calendar"));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::not_found(format!(
                "calendar not found: {}",
                calendar_id
            )));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            return Err(SourceError::rate_limited(format!(
                "rate limit exceeded{}",
                retry_after
                    .map(|s| format!(", retry after {} seconds", s))
                    .unwrap_or_default()
            )));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::server(format!(
                "calendar API error ({}): {}",
                status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::network(format!("failed to read response: {}", e)))?;

        serde_json::from_str(&body)
            .map_err(|e| SourceError::invalid_response(format!("failed to parse response: {}", e)))
    }
}

/// One page of the events list response.
#[derive(Debug, Deserialize)]
struct WireEventList {
    #[serde(default)]
    items: Vec<WireEvent>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

/// An event as the Calendar API sends it. Only the fields the display
/// pipeline consumes are kept.
#[derive(Debug, Default, Deserialize)]
struct WireEvent {
    id: Option<String>,
    status: Option<String>,
    #[serde(default)]
    start: Option<WireBoundary>,
    #[serde(default)]
    end: Option<WireBoundary>,
    summary: Option<String>,
    description: Option<String>,
}

/// A start/end field as the Calendar API sends it. Times arrive as strings
/// and are parsed leniently: an unparsable or absent value degrades to a
/// missing boundary rather than rejecting the event.
#[derive(Debug, Default, Deserialize)]
struct WireBoundary {
    #[serde(rename = "dateTime")]
    date_time: Option<String>,
    date: Option<String>,
    #[serde(rename = "timeZone")]
    time_zone: Option<String>,
}

/// Converts a wire event into a [`RoomEvent`].
///
/// Events without an id carry nothing the pipeline can key on and are
/// skipped. Everything else is preserved, malformed boundaries included;
/// the occupancy deriver is responsible for tolerating them.
fn convert_event(wire: WireEvent) -> Option<RoomEvent> {
    let id = wire.id?;

    let status = wire
        .status
        .as_deref()
        .map(EventStatus::parse)
        .unwrap_or_default();

    let start = convert_boundary(wire.start, &id, "start");
    let end = convert_boundary(wire.end, &id, "end");

    let mut event = RoomEvent::new(id, start, end).with_status(status);
    if let Some(summary) = wire.summary {
        event = event.with_summary(summary);
    }
    if let Some(description) = wire.description {
        event = event.with_description(description);
    }
    Some(event)
}

fn convert_boundary(wire: Option<WireBoundary>, event_id: &str, side: &str) -> EventBoundary {
    let Some(wire) = wire else {
        warn!(event_id, side, "event boundary absent");
        return EventBoundary::missing();
    };

    if let Some(ref raw) = wire.date_time {
        match DateTime::parse_from_rfc3339(raw) {
            Ok(dt) => {
                return EventBoundary {
                    date_time: Some(dt),
                    date: None,
                    time_zone: wire.time_zone,
                };
            }
            Err(e) => {
                warn!(event_id, side, raw, error = %e, "unparsable event dateTime");
            }
        }
    }

    if let Some(ref raw) = wire.date {
        match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => return EventBoundary::all_day(date),
            Err(e) => {
                warn!(event_id, side, raw, error = %e, "unparsable event date");
            }
        }
    }

    EventBoundary::missing()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn parse_event(json: &str) -> Option<RoomEvent> {
        let wire: WireEvent = serde_json::from_str(json).unwrap();
        convert_event(wire)
    }

    #[test]
    fn converts_timed_event() {
        let event = parse_event(
            r#"{
                "id": "evt-1",
                "status": "confirmed",
                "summary": "Standup",
                "start": {"dateTime": "2024-01-01T09:00:00Z"},
                "end": {"dateTime": "2024-01-01T10:00:00Z", "timeZone": "UTC"}
            }"#,
        )
        .unwrap();

        assert_eq!(event.id, "evt-1");
        assert_eq!(event.status, EventStatus::Confirmed);
        assert_eq!(event.summary.as_deref(), Some("Standup"));
        assert_eq!(
            event.effective_start(&Utc),
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap())
        );
        assert_eq!(event.end.time_zone.as_deref(), Some("UTC"));
    }

    #[test]
    fn converts_all_day_event() {
        let event = parse_event(
            r#"{
                "id": "evt-2",
                "start": {"date": "2024-01-01"},
                "end": {"date": "2024-01-02"}
            }"#,
        )
        .unwrap();

        assert!(event.start.is_all_day());
        assert!(event.end.is_all_day());
    }

    #[test]
    fn unknown_status_degrades_to_confirmed() {
        let event = parse_event(
            r#"{"id": "evt-3", "status": "draft", "start": {}, "end": {}}"#,
        )
        .unwrap();
        assert_eq!(event.status, EventStatus::Confirmed);
    }

    #[test]
    fn cancelled_status_is_kept() {
        let event = parse_event(
            r#"{"id": "evt-4", "status": "cancelled", "start": {}, "end": {}}"#,
        )
        .unwrap();
        assert!(event.is_cancelled());
    }

    #[test]
    fn malformed_boundaries_become_missing() {
        let event = parse_event(
            r#"{
                "id": "evt-5",
                "start": {"dateTime": "yesterday-ish"},
                "end": {}
            }"#,
        )
        .unwrap();

        assert!(event.start.is_missing());
        assert!(event.end.is_missing());
    }

    #[test]
    fn event_without_id_is_skipped() {
        assert!(parse_event(r#"{"summary": "orphan"}"#).is_none());
    }

    #[test]
    fn parses_event_list_page() {
        let page: WireEventList = serde_json::from_str(
            r#"{
                "items": [
                    {"id": "a", "start": {"dateTime": "2024-01-01T09:00:00Z"}, "end": {"dateTime": "2024-01-01T10:00:00Z"}},
                    {"id": "b", "start": {"date": "2024-01-01"}, "end": {"date": "2024-01-02"}}
                ],
                "nextPageToken": "page-2"
            }"#,
        )
        .unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.next_page_token.as_deref(), Some("page-2"));
    }

    #[test]
    fn empty_page_parses() {
        let page: WireEventList = serde_json::from_str("{}").unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_page_token.is_none());
    }
}
