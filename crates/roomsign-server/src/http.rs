//! The HTTP API.
//!
//! Three endpoints: a raw event query proxying the calendar source, the
//! per-room snapshot surface, and the booking intent (an explicit no-op).
//! Error bodies are `{"error": message}` throughout.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use roomsign_core::{RoomEvent, TimeWindow};
use roomsign_providers::{CalendarSource, FetchRequest};

use crate::surface::SurfaceHandle;

/// Shared state behind the router.
#[derive(Clone)]
pub struct AppState {
    /// The calendar source raw event queries go through.
    pub source: Arc<dyn CalendarSource>,
    /// Running surfaces, keyed by room name.
    pub surfaces: Arc<HashMap<String, SurfaceHandle>>,
}

impl AppState {
    /// Creates the shared state.
    pub fn new(
        source: Arc<dyn CalendarSource>,
        surfaces: HashMap<String, SurfaceHandle>,
    ) -> Self {
        Self {
            source,
            surfaces: Arc::new(surfaces),
        }
    }
}

/// Builds the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/getEvents", get(get_events))
        .route("/api/rooms/{name}", get(get_room))
        .route("/api/rooms/{name}/book", post(book_room))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct EventsQuery {
    #[serde(rename = "calendarId")]
    calendar_id: Option<String>,
    #[serde(rename = "timeMin")]
    time_min: Option<String>,
    #[serde(rename = "timeMax")]
    time_max: Option<String>,
}

#[derive(Debug, Serialize)]
struct EventsResponse {
    events: Vec<RoomEvent>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// `GET /api/getEvents?calendarId=&timeMin=&timeMax=`
///
/// Proxies one calendar query through the source. An absent or empty
/// calendar id is a client error; so is an unparsable bound. When bounds
/// are omitted the default lookahead window applies.
async fn get_events(State(state): State<AppState>, Query(query): Query<EventsQuery>) -> Response {
    let calendar_id = match query.calendar_id {
        Some(ref id) if !id.is_empty() => id.clone(),
        _ => return error_response(StatusCode::BAD_REQUEST, "Missing calendarId"),
    };

    let window = match parse_window(query.time_min.as_deref(), query.time_max.as_deref()) {
        Ok(window) => window,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    let mut request = FetchRequest::new(&calendar_id);
    if let Some(window) = window {
        request = request.with_window(window);
    }

    match state.source.fetch_events(request).await {
        Ok(events) => {
            debug!(calendar_id = %calendar_id, count = events.len(), "served event query");
            Json(EventsResponse { events }).into_response()
        }
        Err(e) => {
            error!(calendar_id = %calendar_id, error = %e, "event query failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Parses optional RFC3339 bounds into an explicit window. Both bounds
/// must be present to override the default.
fn parse_window(
    time_min: Option<&str>,
    time_max: Option<&str>,
) -> Result<Option<TimeWindow>, String> {
    let min = time_min.map(parse_bound("timeMin")).transpose()?;
    let max = time_max.map(parse_bound("timeMax")).transpose()?;

    match (min, max) {
        (Some(min), Some(max)) => {
            if min > max {
                return Err("timeMin must not be after timeMax".to_string());
            }
            Ok(Some(TimeWindow::new(min, max)))
        }
        (None, None) => Ok(None),
        _ => Err("timeMin and timeMax must be given together".to_string()),
    }
}

fn parse_bound(name: &'static str) -> impl Fn(&str) -> Result<DateTime<Utc>, String> {
    move |raw| {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| format!("invalid {}: {}", name, e))
    }
}

/// `GET /api/rooms/{name}`
///
/// The latest snapshot for a configured room.
async fn get_room(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match state.surfaces.get(&name) {
        Some(handle) => Json(handle.snapshot()).into_response(),
        None => error_response(StatusCode::NOT_FOUND, format!("unknown room: {}", name)),
    }
}

/// `POST /api/rooms/{name}/book`
///
/// The "Book Now" intent. Booking never reaches the provider; the
/// endpoint exists so the button has somewhere honest to land.
async fn book_room(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    if !state.surfaces.contains_key(&name) {
        return error_response(StatusCode::NOT_FOUND, format!("unknown room: {}", name));
    }
    error_response(StatusCode::NOT_IMPLEMENTED, "booking is not implemented")
}
