//! Calendar source implementations for roomsign.
//!
//! This crate defines the [`CalendarSource`] trait the occupancy pipeline
//! fetches through, and ships the Google Calendar implementation plus an
//! in-memory fixture for tests.

pub mod error;
pub mod google;
pub mod source;

pub use error::{SourceError, SourceErrorCode, SourceResult};
pub use google::{
    CREDENTIALS_ENV, GoogleCalendarClient, GoogleCalendarSource, ServiceAccountCredentials,
    StaticTokenSource, TokenSource,
};
pub use source::{BoxFuture, CalendarSource, FetchRequest, FixtureSource};
