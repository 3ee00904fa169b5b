//! Room status daemon.
//!
//! This crate wires the pieces together:
//! - Per-room surfaces that fetch a calendar and derive the display model
//! - The HTTP API serving raw event queries and room snapshots
//! - TOML configuration and the daemon entry point

pub mod config;
pub mod error;
pub mod http;
pub mod surface;

pub use config::{RoomConfig, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use http::{AppState, create_router};
pub use surface::{RoomSurface, SurfaceConfig, SurfaceHandle, SurfaceSnapshot};
