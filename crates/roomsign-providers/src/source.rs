//! The CalendarSource trait.
//!
//! [`CalendarSource`] is the seam between the occupancy pipeline and
//! whatever backend holds the room calendars. A source takes a calendar id
//! and a time window and returns an ordered event list; everything else
//! (authentication, pagination, recurrence expansion) happens behind it.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use roomsign_core::{RoomEvent, TimeWindow};

use crate::error::{SourceError, SourceErrorCode, SourceResult};

/// A boxed future for object-safe async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A request for one calendar's events.
///
/// The calendar id must be non-empty; that precondition belongs to the
/// caller (the HTTP layer turns an absent id into a client error before a
/// request is ever built).
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// The calendar to fetch.
    pub calendar_id: String,
    /// Explicit query window. When absent the default lookahead applies.
    pub window: Option<TimeWindow>,
}

impl FetchRequest {
    /// Creates a request with the default window.
    pub fn new(calendar_id: impl Into<String>) -> Self {
        Self {
            calendar_id: calendar_id.into(),
            window: None,
        }
    }

    /// Builder: set an explicit window.
    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = Some(window);
        self
    }

    /// The window this request resolves to: the explicit one, or
    /// `now` through 48 hours later.
    pub fn resolved_window(&self, now: DateTime<Utc>) -> TimeWindow {
        self.window
            .clone()
            .unwrap_or_else(|| TimeWindow::lookahead(now))
    }
}

/// A backend holding room calendars.
///
/// # Contract
///
/// - Returned events are sorted ascending by effective start time.
/// - Recurring events arrive already expanded to single occurrences.
/// - Events that ended before the window opened are dropped.
/// - Any failure surfaces as one [`SourceError`]; never partial results.
pub trait CalendarSource: Send + Sync {
    /// Returns the name of this source (e.g. "google").
    fn name(&self) -> &str;

    /// Fetches one calendar's events within the request's window.
    fn fetch_events(&self, request: FetchRequest) -> BoxFuture<'_, SourceResult<Vec<RoomEvent>>>;
}

/// An in-memory source serving a fixed event list or a fixed failure.
///
/// Used in tests and demos; also handy as a placeholder when a real source
/// fails to initialize.
#[derive(Debug, Clone)]
pub struct FixtureSource {
    events: Vec<RoomEvent>,
    failure: Option<(SourceErrorCode, String)>,
}

impl FixtureSource {
    /// Creates a fixture that always returns the given events.
    pub fn with_events(events: Vec<RoomEvent>) -> Self {
        Self {
            events,
            failure: None,
        }
    }

    /// Creates a fixture that always fails.
    pub fn failing(code: SourceErrorCode, message: impl Into<String>) -> Self {
        Self {
            events: Vec::new(),
            failure: Some((code, message.into())),
        }
    }
}

impl CalendarSource for FixtureSource {
    fn name(&self) -> &str {
        "fixture"
    }

    fn fetch_events(&self, _request: FetchRequest) -> BoxFuture<'_, SourceResult<Vec<RoomEvent>>> {
        let result = match &self.failure {
            Some((code, message)) => {
                Err(SourceError::new(*code, message.clone()).with_source_name("fixture"))
            }
            None => Ok(self.events.clone()),
        };
        Box::pin(async move { result })
    }
}
