//! The display model handed to presentation.
//!
//! [`RoomDisplay`] is what a room page renders: booked or free, "booked
//! until" text, the headline event, and the full event list. It is built
//! fresh from one fetch cycle's events and fully replaced on the next.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::event::RoomEvent;
use crate::occupancy::{OccupancyPolicy, derive_occupancy};
use crate::time::format_time_of_day;

/// The derived state a room page renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDisplay {
    /// Whether the room is currently inside an event's interval.
    pub is_booked: bool,
    /// "HH:MM" end of the occupying event; null when the room is free.
    pub booked_until: Option<String>,
    /// The headline event (first of the sequence), independent of booking.
    pub featured_event: Option<RoomEvent>,
    /// The full fetched event list, in provider order. Cancelled or
    /// malformed events stay visible here even when they are excluded from
    /// the occupancy decision.
    pub events: Vec<RoomEvent>,
}

impl RoomDisplay {
    /// Derives the display model for one fetch cycle.
    ///
    /// `now` should be sampled at evaluation time, not carried over from
    /// when the fetch was issued.
    pub fn derive<Tz>(
        events: Vec<RoomEvent>,
        now: DateTime<Utc>,
        tz: &Tz,
        policy: OccupancyPolicy,
    ) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let occupancy = derive_occupancy(&events, now, tz, policy);
        Self {
            is_booked: occupancy.is_occupied,
            booked_until: occupancy
                .occupied_until
                .map(|end| format_time_of_day(end, tz)),
            featured_event: occupancy.featured_event,
            events,
        }
    }

    /// The display model for a room with no events.
    pub fn empty() -> Self {
        Self {
            is_booked: false,
            booked_until: None,
            featured_event: None,
            events: Vec::new(),
        }
    }
}
