//! Google Calendar provider.

pub mod client;
pub mod credentials;
pub mod source;
pub mod token;

pub use client::GoogleCalendarClient;
pub use credentials::{CREDENTIALS_ENV, ServiceAccountCredentials};
pub use source::GoogleCalendarSource;
pub use token::{StaticTokenSource, TokenSource};
