//! Server configuration.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use roomsign_core::{DEFAULT_LOOKAHEAD_HOURS, OccupancyPolicy};

use crate::error::{ServerError, ServerResult};

/// Server configuration, loaded from a TOML file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Address the HTTP API binds to.
    pub bind: String,

    /// The rooms this instance serves.
    pub rooms: Vec<RoomConfig>,

    /// How far ahead to fetch events, in hours.
    pub lookahead_hours: i64,

    /// Periodic refetch interval in seconds. Absent means fetch once per
    /// surface and refetch only on explicit request.
    pub refresh_interval_secs: Option<u64>,

    /// Cosmetic clock tick in seconds.
    pub clock_tick_secs: u64,

    /// Whether cancelled events are excluded from occupancy.
    pub exclude_cancelled: bool,

    /// Path to a service-account JSON file. When absent, credentials come
    /// from the environment.
    pub credentials_file: Option<PathBuf>,
}

/// One room and the calendar behind it.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoomConfig {
    /// Room name, used in API paths.
    pub name: String,
    /// Calendar id holding the room's bookings.
    pub calendar_id: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:7080".to_string(),
            rooms: Vec::new(),
            lookahead_hours: DEFAULT_LOOKAHEAD_HOURS,
            refresh_interval_secs: None,
            clock_tick_secs: 1,
            exclude_cancelled: false,
            credentials_file: None,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> ServerResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            ServerError::config(format!(
                "failed to parse {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Builder: set the bind address.
    pub fn with_bind(mut self, bind: impl Into<String>) -> Self {
        self.bind = bind.into();
        self
    }

    /// Builder: add a room.
    pub fn with_room(mut self, name: impl Into<String>, calendar_id: impl Into<String>) -> Self {
        self.rooms.push(RoomConfig {
            name: name.into(),
            calendar_id: calendar_id.into(),
        });
        self
    }

    /// Checks the configuration for inconsistencies.
    pub fn validate(&self) -> ServerResult<()> {
        if self.lookahead_hours <= 0 {
            return Err(ServerError::config("lookahead_hours must be positive"));
        }
        if self.clock_tick_secs == 0 {
            return Err(ServerError::config("clock_tick_secs must be positive"));
        }
        if self.refresh_interval_secs == Some(0) {
            return Err(ServerError::config(
                "refresh_interval_secs must be positive when set",
            ));
        }
        let mut seen = std::collections::HashSet::new();
        for room in &self.rooms {
            if room.name.is_empty() {
                return Err(ServerError::config("room name must not be empty"));
            }
            if room.calendar_id.is_empty() {
                return Err(ServerError::config(format!(
                    "room {} has an empty calendar_id",
                    room.name
                )));
            }
            if !seen.insert(room.name.as_str()) {
                return Err(ServerError::config(format!(
                    "duplicate room name: {}",
                    room.name
                )));
            }
        }
        Ok(())
    }

    /// The parsed bind address.
    pub fn bind_addr(&self) -> ServerResult<SocketAddr> {
        self.bind
            .parse()
            .map_err(|e| ServerError::config(format!("invalid bind address {}: {}", self.bind, e)))
    }

    /// The occupancy policy this configuration implies.
    pub fn policy(&self) -> OccupancyPolicy {
        OccupancyPolicy::default().with_exclude_cancelled(self.exclude_cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind, "127.0.0.1:7080");
        assert_eq!(config.lookahead_hours, 48);
        assert_eq!(config.clock_tick_secs, 1);
        assert!(config.refresh_interval_secs.is_none());
        assert!(!config.exclude_cancelled);
        assert!(config.rooms.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn loads_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
bind = "0.0.0.0:8080"
refresh_interval_secs = 300
exclude_cancelled = true

[[rooms]]
name = "vortex"
calendar_id = "vortex@example.com"

[[rooms]]
name = "test"
calendar_id = "test@example.com"
"#
        )
        .unwrap();

        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.bind, "0.0.0.0:8080");
        assert_eq!(config.refresh_interval_secs, Some(300));
        assert!(config.exclude_cancelled);
        assert_eq!(config.rooms.len(), 2);
        assert_eq!(config.rooms[0].name, "vortex");
        assert!(config.policy().exclude_cancelled);
    }

    #[test]
    fn rejects_unknown_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "listen = \"127.0.0.1:7080\"").unwrap();
        assert!(ServerConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn rejects_duplicate_rooms() {
        let config = ServerConfig::default()
            .with_room("vortex", "a@example.com")
            .with_room("vortex", "b@example.com");
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_intervals() {
        let mut config = ServerConfig::default();
        config.clock_tick_secs = 0;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.refresh_interval_secs = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn parses_bind_addr() {
        let config = ServerConfig::default();
        assert!(config.bind_addr().is_ok());

        let config = ServerConfig::default().with_bind("not an address");
        assert!(config.bind_addr().is_err());
    }
}
