//! The occupancy deriver.
//!
//! Pure function from `(events, now)` to an [`OccupancyResult`]: whether the
//! room is currently inside an event's interval, when that event ends, and
//! which event to feature for headline display. No I/O, no hidden state;
//! identical inputs always produce identical results.
//!
//! The event sequence is expected to arrive sorted ascending by start time
//! (a provider contract). The deriver does not re-sort it.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::event::RoomEvent;

/// Controls which events participate in occupancy derivation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OccupancyPolicy {
    /// Drop cancelled events before deriving occupancy and the featured
    /// event. Off by default: the observed behavior lets a cancelled event
    /// occupy a room, and whether that is intended is still a pending
    /// product decision.
    pub exclude_cancelled: bool,
}

impl OccupancyPolicy {
    /// Builder: set cancelled-event exclusion.
    pub fn with_exclude_cancelled(mut self, exclude: bool) -> Self {
        self.exclude_cancelled = exclude;
        self
    }

    fn admits(&self, event: &RoomEvent) -> bool {
        !(self.exclude_cancelled && event.is_cancelled())
    }
}

/// The derived occupancy state of a room at one instant.
///
/// Recomputed from scratch on every fetch cycle; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyResult {
    /// Whether some event's interval contains `now`.
    pub is_occupied: bool,
    /// Effective end of the occupying event. Populated only while
    /// `is_occupied` is true; not meaningful otherwise.
    pub occupied_until: Option<DateTime<Utc>>,
    /// The event chosen for headline display: the first event of the
    /// (policy-filtered) sequence, independent of occupancy.
    pub featured_event: Option<RoomEvent>,
}

impl OccupancyResult {
    /// The result for a room with no events at all.
    pub fn vacant() -> Self {
        Self {
            is_occupied: false,
            occupied_until: None,
            featured_event: None,
        }
    }
}

/// Derives the occupancy state of a room.
///
/// The occupying event is the *first* event in input order whose interval
/// contains `now`; since input is start-ascending, the earliest start wins.
/// At most one event is ever treated as occupying. Events whose boundaries
/// fail to resolve simply never match.
///
/// `tz` is the zone in which all-day dates are anchored.
pub fn derive_occupancy<Tz>(
    events: &[RoomEvent],
    now: DateTime<Utc>,
    tz: &Tz,
    policy: OccupancyPolicy,
) -> OccupancyResult
where
    Tz: TimeZone,
{
    let mut considered = events.iter().filter(|event| policy.admits(event));
    let featured_event = considered.next().cloned();

    let occupying = events
        .iter()
        .filter(|event| policy.admits(event))
        .find(|event| event.occupies_at(now, tz));

    OccupancyResult {
        is_occupied: occupying.is_some(),
        occupied_until: occupying.and_then(|event| event.effective_end(tz)),
        featured_event,
    }
}

/// The display-list partition of a room's schedule.
///
/// A split of the sequence as fetched, not a recomputation: element 0 is
/// featured, the rest are upcoming, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSplit<'a> {
    /// The headline event, if any.
    pub featured: Option<&'a RoomEvent>,
    /// The remaining events, in input order.
    pub upcoming: &'a [RoomEvent],
}

/// Partitions an event sequence into featured (index 0) and upcoming
/// (everything after it).
pub fn split_schedule(events: &[RoomEvent]) -> ScheduleSplit<'_> {
    match events.split_first() {
        Some((featured, upcoming)) => ScheduleSplit {
            featured: Some(featured),
            upcoming,
        },
        None => ScheduleSplit {
            featured: None,
            upcoming: &[],
        },
    }
}

impl fmt::Display for OccupancyResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_occupied {
            write!(f, "occupied")?;
            if let Some(until) = self.occupied_until {
                write!(f, " until {}", until.format("%H:%M"))?;
            }
            Ok(())
        } else {
            write!(f, "free")
        }
    }
}
