//! In-process messaging engine.
//!
//! Keeps friends and conferences in memory and delivers messages to an
//! outbox instead of a network. One friend can be marked as the console
//! operator; messages to that friend are printed to stdout.

use std::collections::{BTreeMap, BTreeSet};

use confbot_proto::{Address, MAX_NAME_LENGTH, MAX_STATUS_MESSAGE_LENGTH, PublicKey, clamp_str};
use serde::{Deserialize, Serialize};

use crate::state::unix_now;

use super::{Conferences, EngineError, FriendId, Messenger, RoomId, RoomKind, Snapshot, UserStatus};

/// A message the engine would have put on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outgoing {
    pub friend: FriendId,
    pub text: String,
}

#[derive(Debug, Clone)]
struct Friend {
    key: PublicKey,
    name: String,
    online: bool,
    last_online: u64,
}

#[derive(Debug, Clone)]
struct Conference {
    kind: RoomKind,
    title: String,
    peers: BTreeSet<FriendId>,
    messages: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SavedProfile {
    public_key: String,
    nospam: u32,
    name: String,
    #[serde(default)]
    status: UserStatus,
    #[serde(default)]
    status_message: String,
    #[serde(default)]
    friends: Vec<SavedFriend>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SavedFriend {
    public_key: String,
    name: String,
    last_online: u64,
}

/// In-memory [`Engine`](super::Engine).
#[derive(Debug)]
pub struct LocalEngine {
    key: PublicKey,
    nospam: u32,
    name: String,
    status: UserStatus,
    status_message: String,
    friends: BTreeMap<FriendId, Friend>,
    next_friend: u32,
    rooms: BTreeMap<RoomId, Conference>,
    outbox: Vec<Outgoing>,
    console: Option<FriendId>,
    pinned: BTreeSet<RoomId>,
}

impl Default for LocalEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalEngine {
    /// Engine with a freshly generated identity.
    pub fn new() -> Self {
        Self::with_identity(PublicKey(rand::random()), rand::random())
    }

    pub fn with_identity(key: PublicKey, nospam: u32) -> Self {
        Self {
            key,
            nospam,
            name: String::new(),
            status: UserStatus::Online,
            status_message: String::new(),
            friends: BTreeMap::new(),
            next_friend: 0,
            rooms: BTreeMap::new(),
            outbox: Vec::new(),
            console: None,
            pinned: BTreeSet::new(),
        }
    }

    /// Add a friend directly, bypassing the request flow. An existing
    /// friend with the same key is renamed and reused.
    pub fn add_contact(&mut self, key: PublicKey, name: &str, online: bool) -> FriendId {
        let now = unix_now();
        if let Some((&id, friend)) = self.friends.iter_mut().find(|(_, f)| f.key == key) {
            friend.name = clamp_str(name, MAX_NAME_LENGTH).to_string();
            friend.online = online;
            if online {
                friend.last_online = now;
            }
            return id;
        }
        let id = FriendId(self.next_friend);
        self.next_friend += 1;
        self.friends.insert(
            id,
            Friend {
                key,
                name: clamp_str(name, MAX_NAME_LENGTH).to_string(),
                online,
                last_online: now,
            },
        );
        id
    }

    /// Mark a friend on- or offline. Going offline stamps `last_online`.
    pub fn set_online(&mut self, friend: FriendId, online: bool) {
        if let Some(f) = self.friends.get_mut(&friend) {
            if f.online && !online {
                f.last_online = unix_now();
            }
            f.online = online;
        }
    }

    /// Override when an offline friend was last seen.
    pub fn set_last_online(&mut self, friend: FriendId, at: u64) {
        if let Some(f) = self.friends.get_mut(&friend) {
            f.last_online = at;
        }
    }

    /// Print messages addressed to `friend` instead of queueing them.
    pub fn set_console(&mut self, friend: Option<FriendId>) {
        self.console = friend;
    }

    /// Make `delete` refuse `room`, as a transport failure would.
    pub fn pin_room(&mut self, room: RoomId) {
        self.pinned.insert(room);
    }

    /// Drain queued outgoing messages.
    pub fn take_outbox(&mut self) -> Vec<Outgoing> {
        std::mem::take(&mut self.outbox)
    }

    /// Simulate a friend joining one of the bot's rooms.
    pub fn join_peer(&mut self, room: RoomId, friend: FriendId) -> bool {
        match self.rooms.get_mut(&room) {
            Some(conference) if self.friends.contains_key(&friend) => {
                conference.peers.insert(friend);
                true
            }
            _ => false,
        }
    }

    /// Simulate a peer leaving a room.
    pub fn part_peer(&mut self, room: RoomId, friend: FriendId) -> bool {
        self.rooms
            .get_mut(&room)
            .is_some_and(|conference| conference.peers.remove(&friend))
    }

    pub fn conference_title(&self, room: RoomId) -> Option<&str> {
        self.rooms.get(&room).map(|c| c.title.as_str())
    }

    pub fn conference_kind(&self, room: RoomId) -> Option<RoomKind> {
        self.rooms.get(&room).map(|c| c.kind)
    }

    pub fn conference_messages(&self, room: RoomId) -> &[String] {
        self.rooms
            .get(&room)
            .map_or(&[][..], |c| c.messages.as_slice())
    }

    pub fn is_member(&self, room: RoomId, friend: FriendId) -> bool {
        self.rooms
            .get(&room)
            .is_some_and(|c| c.peers.contains(&friend))
    }

    pub fn status(&self) -> UserStatus {
        self.status
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn public_self_key(&self) -> PublicKey {
        self.key
    }

    /// Lowest room number not in use.
    fn free_room_id(&self) -> RoomId {
        let mut id = 0;
        while self.rooms.contains_key(&RoomId(id)) {
            id += 1;
        }
        RoomId(id)
    }

    fn open_room(&mut self, kind: RoomKind) -> RoomId {
        let id = self.free_room_id();
        self.rooms.insert(
            id,
            Conference {
                kind,
                title: String::new(),
                peers: BTreeSet::new(),
                messages: Vec::new(),
            },
        );
        id
    }
}

impl Messenger for LocalEngine {
    fn send_text(&mut self, friend: FriendId, text: &str) -> Result<(), EngineError> {
        if !self.friends.contains_key(&friend) {
            return Err(EngineError::NoSuchFriend(friend));
        }
        if self.console == Some(friend) {
            println!("{text}");
        } else {
            self.outbox.push(Outgoing {
                friend,
                text: text.to_string(),
            });
        }
        Ok(())
    }

    fn display_name(&self, friend: FriendId) -> String {
        self.friends
            .get(&friend)
            .map(|f| f.name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "Anonymous".to_string())
    }

    fn public_key(&self, friend: FriendId) -> Option<PublicKey> {
        self.friends.get(&friend).map(|f| f.key)
    }

    fn add_friend(&mut self, key: PublicKey) -> Result<FriendId, EngineError> {
        if key == self.key {
            return Err(EngineError::Failed {
                op: "add_friend",
                code: 3,
            });
        }
        if self.friends.values().any(|f| f.key == key) {
            return Err(EngineError::Failed {
                op: "add_friend",
                code: 5,
            });
        }
        Ok(self.add_contact(key, "", false))
    }

    fn delete_friend(&mut self, friend: FriendId) -> bool {
        if self.friends.remove(&friend).is_none() {
            return false;
        }
        for conference in self.rooms.values_mut() {
            conference.peers.remove(&friend);
        }
        if self.console == Some(friend) {
            self.console = None;
        }
        true
    }

    fn friends(&self) -> Vec<FriendId> {
        self.friends.keys().copied().collect()
    }

    fn last_online(&self, friend: FriendId) -> Option<u64> {
        self.friends
            .get(&friend)
            .map(|f| if f.online { unix_now() } else { f.last_online })
    }

    fn friend_count(&self) -> usize {
        self.friends.len()
    }

    fn online_friend_count(&self) -> usize {
        self.friends.values().filter(|f| f.online).count()
    }

    fn self_address(&self) -> Address {
        Address::new(self.key, self.nospam)
    }

    fn self_name(&self) -> String {
        self.name.clone()
    }

    fn set_name(&mut self, name: &str) {
        self.name = clamp_str(name, MAX_NAME_LENGTH).to_string();
    }

    fn set_status(&mut self, status: UserStatus) {
        self.status = status;
    }

    fn set_status_message(&mut self, message: &str) {
        self.status_message = clamp_str(message, MAX_STATUS_MESSAGE_LENGTH).to_string();
    }
}

impl Conferences for LocalEngine {
    fn create(&mut self, kind: RoomKind) -> Result<RoomId, EngineError> {
        Ok(self.open_room(kind))
    }

    fn join(&mut self, friend: FriendId, kind: RoomKind, cookie: &[u8]) -> Result<RoomId, EngineError> {
        if !self.friends.contains_key(&friend) {
            return Err(EngineError::NoSuchFriend(friend));
        }
        if cookie.is_empty() {
            return Err(EngineError::Failed { op: "join", code: 1 });
        }
        let room = self.open_room(kind);
        self.join_peer(room, friend);
        Ok(room)
    }

    fn delete(&mut self, room: RoomId) -> bool {
        if self.pinned.contains(&room) {
            return false;
        }
        self.rooms.remove(&room).is_some()
    }

    fn invite(&mut self, friend: FriendId, room: RoomId) -> bool {
        // Invites are accepted immediately.
        self.join_peer(room, friend)
    }

    fn member_count(&self, room: RoomId) -> Result<u32, EngineError> {
        let conference = self.rooms.get(&room).ok_or(EngineError::NoSuchRoom(room))?;
        Ok(conference.peers.len() as u32 + 1)
    }

    fn set_title(&mut self, room: RoomId, title: &str) -> bool {
        match self.rooms.get_mut(&room) {
            Some(conference) => {
                conference.title = clamp_str(title, MAX_NAME_LENGTH).to_string();
                true
            }
            None => false,
        }
    }

    fn send_message(&mut self, room: RoomId, text: &str) -> bool {
        match self.rooms.get_mut(&room) {
            Some(conference) => {
                conference.messages.push(text.to_string());
                true
            }
            None => false,
        }
    }

    fn list(&self) -> Vec<RoomId> {
        self.rooms.keys().copied().collect()
    }
}

impl Snapshot for LocalEngine {
    /// Conferences are not part of the snapshot; rooms never survive a
    /// restart.
    fn snapshot(&self) -> Result<Vec<u8>, EngineError> {
        let profile = SavedProfile {
            public_key: self.key.to_hex(),
            nospam: self.nospam,
            name: self.name.clone(),
            status: self.status,
            status_message: self.status_message.clone(),
            friends: self
                .friends
                .values()
                .map(|f| SavedFriend {
                    public_key: f.key.to_hex(),
                    name: f.name.clone(),
                    last_online: if f.online { unix_now() } else { f.last_online },
                })
                .collect(),
        };
        serde_json::to_vec_pretty(&profile).map_err(|e| EngineError::Snapshot(e.to_string()))
    }

    fn restore(&mut self, blob: &[u8]) -> Result<(), EngineError> {
        let profile: SavedProfile =
            serde_json::from_slice(blob).map_err(|e| EngineError::Snapshot(e.to_string()))?;
        let key = profile
            .public_key
            .parse::<PublicKey>()
            .map_err(|e| EngineError::Snapshot(e.to_string()))?;

        let mut friends = BTreeMap::new();
        for (number, saved) in profile.friends.into_iter().enumerate() {
            let friend_key = saved
                .public_key
                .parse::<PublicKey>()
                .map_err(|e| EngineError::Snapshot(e.to_string()))?;
            friends.insert(
                FriendId(number as u32),
                Friend {
                    key: friend_key,
                    name: saved.name,
                    online: false,
                    last_online: saved.last_online,
                },
            );
        }

        self.key = key;
        self.nospam = profile.nospam;
        self.name = profile.name;
        self.status = profile.status;
        self.status_message = profile.status_message;
        self.next_friend = friends.len() as u32;
        self.friends = friends;
        self.rooms.clear();
        self.console = None;
        Ok(())
    }
}
