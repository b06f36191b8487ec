//! Background maintenance timing.

use std::time::Duration;

use serde::Deserialize;

/// Intervals for the periodic maintenance task. All values are seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct MaintenanceConfig {
    /// How often inactive friends are purged (default: 3600).
    #[serde(default = "default_friend_purge_interval")]
    pub friend_purge_interval: u64,
    /// How often rooms are checked for emptiness (default: 60).
    #[serde(default = "default_room_sweep_interval")]
    pub room_sweep_interval: u64,
    /// Minimum room age before an empty room may be swept (default: 300).
    /// Gives invitees time to join a freshly created room.
    #[serde(default = "default_empty_room_grace")]
    pub empty_room_grace: u64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            friend_purge_interval: default_friend_purge_interval(),
            room_sweep_interval: default_room_sweep_interval(),
            empty_room_grace: default_empty_room_grace(),
        }
    }
}

impl MaintenanceConfig {
    /// Purge period. Zero is raised to one second.
    pub fn purge_period(&self) -> Duration {
        Duration::from_secs(self.friend_purge_interval.max(1))
    }

    /// Sweep period. Zero is raised to one second.
    pub fn sweep_period(&self) -> Duration {
        Duration::from_secs(self.room_sweep_interval.max(1))
    }

    pub fn grace(&self) -> Duration {
        Duration::from_secs(self.empty_room_grace)
    }
}

fn default_friend_purge_interval() -> u64 {
    3600
}

fn default_room_sweep_interval() -> u64 {
    60
}

fn default_empty_room_grace() -> u64 {
    300
}
