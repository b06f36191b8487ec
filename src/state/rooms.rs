//! Room registry.
//!
//! Tracks the bot-level metadata for every room the engine has open:
//! kind, password and title. Slots are reused, so storage stays dense.
//!
//! Layout invariants:
//! - storage length always equals `chats_idx`, one past the highest slot
//!   ever handed out that is still in use;
//! - no trailing inactive slot survives a removal;
//! - at most one active slot per [`RoomId`].

use std::time::Instant;

use confbot_proto::{MAX_NAME_LENGTH, clamp_str};

use crate::engine::{RoomId, RoomKind};
use crate::error::RegistryError;

/// Default ceiling on registry slots.
pub const DEFAULT_MAX_ROOMS: usize = 512;

/// Per-room metadata kept by the bot.
#[derive(Debug, Clone)]
pub struct RoomRecord {
    pub room_id: RoomId,
    pub kind: RoomKind,
    active: bool,
    password: Option<String>,
    title: String,
    created_at: Instant,
}

impl RoomRecord {
    fn new(room_id: RoomId, kind: RoomKind, password: Option<&str>) -> Self {
        Self {
            room_id,
            kind,
            active: true,
            password: password.map(str::to_string),
            title: String::new(),
            created_at: Instant::now(),
        }
    }

    fn vacant() -> Self {
        Self {
            room_id: RoomId(0),
            kind: RoomKind::Text,
            active: false,
            password: None,
            title: String::new(),
            created_at: Instant::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    /// Replace or clear the password. Length is checked by the caller.
    pub fn set_password(&mut self, password: Option<&str>) {
        self.password = password.map(str::to_string);
    }

    /// Whether an invite with `offered` may proceed. A room without a
    /// password admits anyone; a protected room needs an exact match.
    pub fn check_password(&self, offered: Option<&str>) -> bool {
        match &self.password {
            None => true,
            Some(expected) => offered == Some(expected.as_str()),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn title_len(&self) -> usize {
        self.title.len()
    }

    /// Set the title, truncated to [`MAX_NAME_LENGTH`] bytes.
    pub fn set_title(&mut self, title: &str) {
        self.title = clamp_str(title, MAX_NAME_LENGTH).to_string();
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }
}

/// Dense, slot-reusing table of [`RoomRecord`]s.
#[derive(Debug)]
pub struct RoomRegistry {
    chats: Vec<RoomRecord>,
    chats_idx: usize,
    max_rooms: usize,
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ROOMS)
    }
}

impl RoomRegistry {
    pub fn new(max_rooms: usize) -> Self {
        Self {
            chats: Vec::new(),
            chats_idx: 0,
            max_rooms,
        }
    }

    /// Record a room the engine just opened and return its slot.
    ///
    /// The lowest inactive slot is reused; otherwise the table grows by
    /// one. If `room_id` is already active (the engine reused a number the
    /// registry never saw released) its slot is overwritten.
    pub fn add(
        &mut self,
        room_id: RoomId,
        kind: RoomKind,
        password: Option<&str>,
    ) -> Result<usize, RegistryError> {
        if let Some(slot) = self.find(room_id) {
            self.chats[slot] = RoomRecord::new(room_id, kind, password);
            return Ok(slot);
        }

        let full = RegistryError::Full {
            limit: self.max_rooms,
        };
        self.chats.try_reserve(1).map_err(|_| full.clone())?;
        self.chats.push(RoomRecord::vacant());

        let Some(slot) = self
            .chats
            .iter()
            .take(self.max_rooms)
            .position(|record| !record.active)
        else {
            self.chats.pop();
            return Err(full);
        };

        self.chats[slot] = RoomRecord::new(room_id, kind, password);
        if slot == self.chats_idx {
            self.chats_idx += 1;
        } else {
            // Reused a hole; drop the spare slot again.
            self.chats.pop();
        }
        Ok(slot)
    }

    /// Release the slot holding `room_id` and shrink past any trailing
    /// inactive slots. Returns `false` if the room was not registered;
    /// trailing cleanup runs either way.
    pub fn remove(&mut self, room_id: RoomId) -> bool {
        let found = match self.find(room_id) {
            Some(slot) => {
                self.chats[slot] = RoomRecord::vacant();
                true
            }
            None => false,
        };

        let mut idx = self.chats_idx;
        while idx > 0 && !self.chats[idx - 1].active {
            idx -= 1;
        }
        self.chats_idx = idx;
        self.chats.truncate(idx);
        self.chats.shrink_to_fit();
        found
    }

    /// Slot index of the active record for `room_id`.
    pub fn find(&self, room_id: RoomId) -> Option<usize> {
        self.chats[..self.chats_idx]
            .iter()
            .position(|record| record.active && record.room_id == room_id)
    }

    /// Active record for `room_id`.
    pub fn record(&self, room_id: RoomId) -> Option<&RoomRecord> {
        self.find(room_id).map(|slot| &self.chats[slot])
    }

    pub fn record_mut(&mut self, room_id: RoomId) -> Option<&mut RoomRecord> {
        self.find(room_id).map(|slot| &mut self.chats[slot])
    }

    /// Record at `slot`, active or not.
    pub fn get(&self, slot: usize) -> Option<&RoomRecord> {
        self.chats.get(slot)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut RoomRecord> {
        self.chats.get_mut(slot)
    }

    /// Drop every record and free storage.
    pub fn clear_all(&mut self) {
        self.chats.clear();
        self.chats.shrink_to_fit();
        self.chats_idx = 0;
    }

    pub fn iter_active(&self) -> impl Iterator<Item = &RoomRecord> {
        self.chats.iter().filter(|record| record.active)
    }

    pub fn active_count(&self) -> usize {
        self.iter_active().count()
    }

    /// One past the highest slot in use.
    pub fn len(&self) -> usize {
        self.chats_idx
    }

    pub fn is_empty(&self) -> bool {
        self.chats_idx == 0
    }

    /// Number of slots physically stored. Always equals [`len`](Self::len).
    pub fn storage_len(&self) -> usize {
        self.chats.len()
    }

    pub fn max_rooms(&self) -> usize {
        self.max_rooms
    }
}
