//! Bot-wide settings that change at runtime.

use crate::engine::RoomId;

pub const SECONDS_IN_DAY: u64 = 86_400;

/// Mutable bot settings shared by command handlers.
#[derive(Debug, Clone)]
pub struct BotState {
    /// Unix time the bot started.
    pub start_time: u64,
    /// Room used by `invite` when no room number is given.
    pub default_room: RoomId,
    /// Friends offline for longer than this many seconds are purged.
    pub inactive_limit: u64,
}

impl BotState {
    pub fn new(start_time: u64, default_room: RoomId, inactive_days: u64) -> Self {
        Self {
            start_time,
            default_room,
            inactive_limit: inactive_days.saturating_mul(SECONDS_IN_DAY),
        }
    }

    /// Seconds since start.
    pub fn uptime(&self, now: u64) -> u64 {
        now.saturating_sub(self.start_time)
    }

    /// Purge threshold in whole days.
    pub fn inactive_days(&self) -> u64 {
        self.inactive_limit / SECONDS_IN_DAY
    }
}

/// Current Unix time in seconds.
pub fn unix_now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

/// Render a duration as `{days}d {hours}h {minutes}m`.
pub fn format_elapsed(secs: u64) -> String {
    let days = secs / SECONDS_IN_DAY;
    let hours = (secs % SECONDS_IN_DAY) / 3600;
    let minutes = (secs % 3600) / 60;
    format!("{days}d {hours}h {minutes}m")
}
