//! Per-room display surfaces.
//!
//! A surface is one room's long-lived state: a background task that fetches
//! the room's calendar, derives the display model, and publishes snapshots
//! over a watch channel. The cosmetic clock ticks every second without
//! touching the derived occupancy; only a fetch replaces the display.
//!
//! Fetches run inline in the task's select loop, so a surface has at most
//! one request in flight at any time. A fetch failure keeps the previous
//! snapshot on screen and records the error alongside it.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use roomsign_core::{OccupancyPolicy, RoomDisplay, TimeWindow};
use roomsign_providers::{CalendarSource, FetchRequest};

use crate::config::{RoomConfig, ServerConfig};

const COMMAND_BUFFER: usize = 16;
const CLOCK_FORMAT: &str = "%H:%M:%S";

/// Configuration for one room surface.
#[derive(Debug, Clone)]
pub struct SurfaceConfig {
    /// Room name.
    pub room: String,
    /// Calendar to fetch.
    pub calendar_id: String,
    /// Fetch window length in hours.
    pub lookahead_hours: i64,
    /// Cosmetic clock tick.
    pub clock_tick: Duration,
    /// Periodic refetch interval. Absent means fetch once and wait for
    /// explicit refresh commands.
    pub refresh_interval: Option<Duration>,
    /// Occupancy policy.
    pub policy: OccupancyPolicy,
}

impl SurfaceConfig {
    /// Builds a surface configuration for one configured room.
    pub fn for_room(server: &ServerConfig, room: &RoomConfig) -> Self {
        Self {
            room: room.name.clone(),
            calendar_id: room.calendar_id.clone(),
            lookahead_hours: server.lookahead_hours,
            clock_tick: Duration::from_secs(server.clock_tick_secs),
            refresh_interval: server.refresh_interval_secs.map(Duration::from_secs),
            policy: server.policy(),
        }
    }
}

/// The state a surface publishes after each tick or fetch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceSnapshot {
    /// Room name.
    pub room: String,
    /// Wall-clock time, updated every tick.
    pub clock: String,
    /// The derived display model from the latest successful fetch.
    pub display: RoomDisplay,
    /// The latest fetch error, cleared on the next success.
    pub last_error: Option<String>,
    /// When the display was last fetched. Absent until the first success.
    pub fetched_at: Option<DateTime<Utc>>,
}

impl SurfaceSnapshot {
    fn initial(room: &str) -> Self {
        Self {
            room: room.to_string(),
            clock: Local::now().format(CLOCK_FORMAT).to_string(),
            display: RoomDisplay::empty(),
            last_error: None,
            fetched_at: None,
        }
    }
}

/// Commands a surface accepts while running.
#[derive(Debug, Clone, Copy)]
enum SurfaceCommand {
    Refresh,
    Shutdown,
}

/// Handle to a running room surface.
#[derive(Debug, Clone)]
pub struct SurfaceHandle {
    snapshot_rx: watch::Receiver<SurfaceSnapshot>,
    command_tx: mpsc::Sender<SurfaceCommand>,
}

impl SurfaceHandle {
    /// The latest published snapshot.
    pub fn snapshot(&self) -> SurfaceSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// A receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SurfaceSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Asks the surface to refetch now.
    pub async fn refresh_now(&self) {
        // A full buffer means a refresh is already queued.
        let _ = self.command_tx.try_send(SurfaceCommand::Refresh);
    }

    /// Asks the surface to stop.
    pub async fn shutdown(&self) {
        let _ = self.command_tx.send(SurfaceCommand::Shutdown).await;
    }
}

/// A room's background fetch-and-derive task.
pub struct RoomSurface;

impl RoomSurface {
    /// Spawns a surface task for the room and returns its handle.
    pub fn spawn(config: SurfaceConfig, source: Arc<dyn CalendarSource>) -> SurfaceHandle {
        let (snapshot_tx, snapshot_rx) = watch::channel(SurfaceSnapshot::initial(&config.room));
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);

        tokio::spawn(run_surface(config, source, snapshot_tx, command_rx));

        SurfaceHandle {
            snapshot_rx,
            command_tx,
        }
    }
}

async fn run_surface(
    config: SurfaceConfig,
    source: Arc<dyn CalendarSource>,
    snapshot_tx: watch::Sender<SurfaceSnapshot>,
    mut command_rx: mpsc::Receiver<SurfaceCommand>,
) {
    info!(
        room = %config.room,
        calendar_id = %config.calendar_id,
        source = source.name(),
        "surface started"
    );

    fetch_and_publish(&config, source.as_ref(), &snapshot_tx).await;

    let mut clock = tokio::time::interval(config.clock_tick);
    clock.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let mut refresh = config
        .refresh_interval
        .map(|d| tokio::time::interval_at(tokio::time::Instant::now() + d, d));

    loop {
        tokio::select! {
            _ = clock.tick() => {
                // Clock ticks are presentation only; the display model is
                // untouched until the next fetch.
                snapshot_tx.send_modify(|snapshot| {
                    snapshot.clock = Local::now().format(CLOCK_FORMAT).to_string();
                });
            }
            _ = next_refresh_tick(&mut refresh) => {
                debug!(room = %config.room, "periodic refresh");
                fetch_and_publish(&config, source.as_ref(), &snapshot_tx).await;
            }
            cmd = command_rx.recv() => {
                match cmd {
                    Some(SurfaceCommand::Refresh) => {
                        debug!(room = %config.room, "refresh requested");
                        fetch_and_publish(&config, source.as_ref(), &snapshot_tx).await;
                    }
                    Some(SurfaceCommand::Shutdown) | None => {
                        info!(room = %config.room, "surface stopping");
                        break;
                    }
                }
            }
        }
    }
}

async fn next_refresh_tick(interval: &mut Option<tokio::time::Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

async fn fetch_and_publish(
    config: &SurfaceConfig,
    source: &dyn CalendarSource,
    snapshot_tx: &watch::Sender<SurfaceSnapshot>,
) {
    let now = Utc::now();
    let window = TimeWindow::from_now(now, chrono::Duration::hours(config.lookahead_hours));
    let request = FetchRequest::new(&config.calendar_id).with_window(window);

    match source.fetch_events(request).await {
        Ok(events) => {
            let display = RoomDisplay::derive(events, Utc::now(), &Local, config.policy);
            snapshot_tx.send_modify(|snapshot| {
                snapshot.clock = Local::now().format(CLOCK_FORMAT).to_string();
                snapshot.display = display;
                snapshot.last_error = None;
                snapshot.fetched_at = Some(now);
            });
        }
        Err(e) => {
            warn!(room = %config.room, error = %e, "fetch failed, keeping previous display");
            snapshot_tx.send_modify(|snapshot| {
                snapshot.last_error = Some(e.to_string());
            });
        }
    }
}
