//! Core types for the room-booking status display: events, time windows,
//! the occupancy deriver, and the display model handed to presentation.

pub mod display;
pub mod event;
pub mod occupancy;
pub mod time;
pub mod tracing;

pub use display::RoomDisplay;
pub use event::{EventBoundary, EventStatus, RoomEvent};
pub use occupancy::{
    OccupancyPolicy, OccupancyResult, ScheduleSplit, derive_occupancy, split_schedule,
};
pub use time::{DEFAULT_LOOKAHEAD_HOURS, TimeWindow, format_time_of_day};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
