//! The bot: engine callbacks, command dispatch and housekeeping.
//!
//! [`Bot`] owns the engine and all bot state. Every entry point takes
//! `&mut self`, so callbacks and maintenance never interleave; the binary
//! shares one instance behind a [`parking_lot::Mutex`] ([`SharedBot`]).

use std::sync::Arc;
use std::time::Duration;

use confbot_proto::PublicKey;
use tracing::{debug, error, info, warn};

use crate::commands::{Context, DispatchOutcome, Dispatcher, Sender};
use crate::config::Config;
use crate::engine::{Engine, EngineError, EngineEvent, FriendId, RoomId, RoomKind};
use crate::security::{KeyList, PermissionGate};
use crate::state::{BotState, DataStore, RoomRegistry, format_elapsed, unix_now};
use crate::telemetry::spans;

/// A bot shared between the event loop and the maintenance task.
pub type SharedBot<E> = Arc<parking_lot::Mutex<Bot<E>>>;

pub struct Bot<E: Engine> {
    engine: E,
    state: BotState,
    rooms: RoomRegistry,
    gate: PermissionGate,
    store: DataStore,
    dispatcher: Dispatcher,
}

impl<E: Engine> Bot<E> {
    pub fn new(engine: E, state: BotState, rooms: RoomRegistry, gate: PermissionGate, store: DataStore) -> Self {
        Self {
            engine,
            state,
            rooms,
            gate,
            store,
            dispatcher: Dispatcher::new(),
        }
    }

    /// Build a bot from configuration. The engine's profile is seeded with
    /// the configured name and status message; [`load`](Self::load) may
    /// replace them with saved values.
    pub fn from_config(mut engine: E, config: &Config) -> Self {
        engine.set_name(&config.bot.name);
        engine.set_status_message(&config.bot.status_message);
        Self::new(
            engine,
            BotState::new(unix_now(), RoomId(config.bot.default_room), config.bot.inactive_days),
            RoomRegistry::new(config.limits.max_rooms),
            PermissionGate::new(
                KeyList::new(&config.files.masters),
                KeyList::new(&config.files.blocked),
            ),
            DataStore::new(&config.files.data),
        )
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn state(&self) -> &BotState {
        &self.state
    }

    pub fn rooms(&self) -> &RoomRegistry {
        &self.rooms
    }

    pub fn gate(&self) -> &PermissionGate {
        &self.gate
    }

    /// Restore settings and the engine from the save file, or write a fresh
    /// save if there is none yet. Saved settings override the configured
    /// ones.
    pub fn load(&mut self) {
        match self.store.read() {
            Ok(Some(saved)) => {
                saved.apply_to(&mut self.state);
                let restored = saved
                    .engine_blob()
                    .map_err(|e| EngineError::Snapshot(e.to_string()))
                    .and_then(|blob| self.engine.restore(&blob));
                match restored {
                    Ok(()) => info!(
                        path = %self.store.path().display(),
                        default_room = %self.state.default_room,
                        inactive_days = self.state.inactive_days(),
                        "Restored saved state"
                    ),
                    Err(e) => warn!(error = %e, "Saved engine state is unusable; starting fresh"),
                }
            }
            Ok(None) => {
                info!(path = %self.store.path().display(), "No saved state; creating one");
                self.save();
            }
            Err(e) => warn!(error = %e, "Failed to read saved state"),
        }
    }

    /// Persist the engine snapshot and bot settings. Returns whether the
    /// save went through.
    pub fn save(&self) -> bool {
        self.store.persist(&self.engine, &self.state)
    }

    /// Log the bot's identity for the operator.
    pub fn log_profile(&self) {
        info!(
            address = %self.engine.self_address(),
            name = %self.engine.self_name(),
            friends = self.engine.friend_count(),
            "Bot profile"
        );
    }

    /// Route one engine callback.
    pub fn handle_event(&mut self, event: EngineEvent) {
        let _span = spans::event(event.kind()).entered();
        match event {
            EngineEvent::FriendRequest { key, message } => self.on_friend_request(key, &message),
            EngineEvent::FriendMessage { friend, text } => {
                self.on_friend_message(friend, &text);
            }
            EngineEvent::ConferenceInvite {
                friend,
                kind,
                cookie,
            } => self.on_conference_invite(friend, kind, &cookie),
            EngineEvent::ConferenceTitle { room, title } => self.on_conference_title(room, &title),
        }
    }

    /// Accept every friend request not on the block list.
    pub fn on_friend_request(&mut self, key: PublicKey, message: &str) {
        if self.gate.is_blocked(&key) {
            info!(key = %key, "Ignoring friend request from blocked key");
            return;
        }
        match self.engine.add_friend(key) {
            Ok(friend) => {
                info!(key = %key, friend = %friend, message, "Accepted friend request");
                self.save();
            }
            Err(e) => warn!(key = %key, error = %e, code = e.code(), "Failed to add friend"),
        }
    }

    /// Dispatch a private message as a command. Returns `None` when the
    /// message was dropped without a reply (blocked sender or empty text).
    pub fn on_friend_message(&mut self, friend: FriendId, text: &str) -> Option<DispatchOutcome> {
        let sender = self.sender(friend);
        if sender.key.is_some_and(|key| self.gate.is_blocked(&key)) {
            debug!(friend = %friend, "Dropping message from blocked key");
            return None;
        }
        if text.is_empty() {
            return None;
        }

        let mut ctx = Context {
            engine: &mut self.engine,
            state: &mut self.state,
            rooms: &mut self.rooms,
            gate: &self.gate,
            store: &self.store,
            sender: &sender,
        };
        Some(self.dispatcher.execute(&mut ctx, text))
    }

    /// Join a conference on a master's invitation. Invites from anyone else
    /// are ignored.
    pub fn on_conference_invite(&mut self, friend: FriendId, kind: RoomKind, cookie: &[u8]) {
        let sender = self.sender(friend);
        if !sender.key.is_some_and(|key| self.gate.is_privileged(&key)) {
            debug!(sender = %sender.name, "Ignoring conference invite from non-master");
            return;
        }

        let room = match self.engine.join(friend, kind, cookie) {
            Ok(room) => room,
            Err(e) => {
                warn!(sender = %sender.name, error = %e, code = e.code(), "Failed to join conference");
                return;
            }
        };
        if let Err(e) = self.rooms.add(room, kind, None) {
            error!(room = %room, error = %e, "Registry insert failed; leaving conference");
            if !self.engine.delete(room) {
                error!(room = %room, "Failed to leave conference; it is now orphaned");
            }
            return;
        }
        info!(room = %room, kind = kind.label(), sender = %sender.name, "Accepted conference invite");
    }

    /// Mirror a title change into the registry.
    pub fn on_conference_title(&mut self, room: RoomId, title: &str) {
        if let Some(record) = self.rooms.record_mut(room) {
            record.set_title(title);
            debug!(room = %room, title, "Room title changed");
        }
    }

    /// Remove friends offline for longer than the inactivity limit. Returns
    /// how many were removed.
    pub fn purge_inactive_friends(&mut self, now: u64) -> usize {
        let _span = spans::maintenance("friend_purge").entered();
        let limit = self.state.inactive_limit;
        let mut purged = 0;

        for friend in self.engine.friends() {
            let Some(last_online) = self.engine.last_online(friend) else {
                continue;
            };
            let idle = now.saturating_sub(last_online);
            if idle <= limit {
                continue;
            }
            let name = self.engine.display_name(friend);
            if self.engine.delete_friend(friend) {
                purged += 1;
                info!(friend = %friend, name = %name, idle = %format_elapsed(idle), "Purged inactive friend");
            }
        }

        if purged > 0 {
            self.save();
        }
        purged
    }

    /// Leave rooms nobody else is in. Rooms younger than `grace` are left
    /// alone. Returns how many rooms were removed.
    pub fn sweep_empty_rooms(&mut self, grace: Duration) -> usize {
        let _span = spans::maintenance("room_sweep").entered();
        let mut removed = 0;
        let mut slot = 0;

        while let Some(record) = self.rooms.get(slot) {
            slot += 1;
            if !record.is_active() || record.created_at().elapsed() < grace {
                continue;
            }
            let room = record.room_id;
            match self.engine.member_count(room) {
                Ok(peers) if peers <= 1 => {
                    if !self.engine.delete(room) {
                        error!(room = %room, "Failed to leave empty room; keeping it");
                        continue;
                    }
                    self.rooms.remove(room);
                    removed += 1;
                    info!(room = %room, "Left empty room");
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(room = %room, error = %e, "Room vanished from engine; forgetting it");
                    self.rooms.remove(room);
                    removed += 1;
                }
            }
        }
        removed
    }

    /// Leave every room and save. Call once before exiting.
    pub fn shutdown(&mut self) {
        for room in self.engine.list() {
            if !self.engine.delete(room) {
                warn!(room = %room, "Failed to leave room during shutdown");
            }
        }
        self.rooms.clear_all();
        if self.save() {
            info!("State saved; shutting down");
        }
    }

    fn sender(&self, friend: FriendId) -> Sender {
        Sender {
            friend,
            key: self.engine.public_key(friend),
            name: self.engine.display_name(friend),
        }
    }
}
