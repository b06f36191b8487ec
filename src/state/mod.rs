//! State management module.
//!
//! Contains the room registry, runtime bot settings and the on-disk save.

mod bot;
mod persistence;
mod rooms;

pub use bot::{BotState, SECONDS_IN_DAY, format_elapsed, unix_now};
pub use persistence::{DataStore, SaveFile};
pub use rooms::{DEFAULT_MAX_ROOMS, RoomRecord, RoomRegistry};
