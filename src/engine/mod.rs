//! Messaging engine seam.
//!
//! The bot never talks to the network itself. Everything it needs from the
//! peer-to-peer messenger is expressed by the traits in this module:
//!
//! - [`Messenger`]: friends, private messages and the bot's own profile
//! - [`Conferences`]: creating, joining and administering group rooms
//! - [`Snapshot`]: opaque state blob for persistence
//!
//! [`Engine`] is the union of the three and is what the rest of the crate
//! takes. [`local::LocalEngine`] is an in-process implementation used by
//! the console binary and the tests.

pub mod local;

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use confbot_proto::{Address, PublicKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Engine-assigned friend number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FriendId(pub u32);

impl fmt::Display for FriendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Engine-assigned conference number. Numbers are reused once a room is
/// deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(pub u32);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RoomId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(RoomId)
    }
}

/// Conference flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomKind {
    #[default]
    Text,
    #[serde(rename = "audio")]
    AudioText,
}

impl RoomKind {
    /// Parse the user-facing room type (`text` or `audio`, any case).
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("text") {
            Some(Self::Text)
        } else if s.eq_ignore_ascii_case("audio") {
            Some(Self::AudioText)
        } else {
            None
        }
    }

    /// Label used in room listings.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::AudioText => "Audio",
        }
    }
}

/// Presence shown to friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Online,
    Away,
    Busy,
}

impl UserStatus {
    /// Parse a presence name (`online`, `away` or `busy`, any case).
    pub fn parse(s: &str) -> Option<Self> {
        [Self::Online, Self::Away, Self::Busy]
            .into_iter()
            .find(|status| s.eq_ignore_ascii_case(status.as_str()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Away => "away",
            Self::Busy => "busy",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures reported by the messaging engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no such room: {0}")]
    NoSuchRoom(RoomId),

    #[error("no such friend: {0}")]
    NoSuchFriend(FriendId),

    #[error("{op} failed (error {code})")]
    Failed { op: &'static str, code: i32 },

    #[error("snapshot error: {0}")]
    Snapshot(String),
}

impl EngineError {
    /// Numeric code for log lines, mirroring the engine's own error codes.
    pub fn code(&self) -> i32 {
        match self {
            Self::NoSuchRoom(_) => 1,
            Self::NoSuchFriend(_) => 2,
            Self::Failed { code, .. } => *code,
            Self::Snapshot(_) => 3,
        }
    }
}

/// Callbacks delivered by the engine, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A stranger asked to become a friend.
    FriendRequest { key: PublicKey, message: String },
    /// A friend sent a private text message.
    FriendMessage { friend: FriendId, text: String },
    /// A friend invited the bot into a conference.
    ConferenceInvite {
        friend: FriendId,
        kind: RoomKind,
        cookie: Vec<u8>,
    },
    /// A conference the bot is in changed its title.
    ConferenceTitle { room: RoomId, title: String },
}

impl EngineEvent {
    /// Short name for spans and log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FriendRequest { .. } => "friend_request",
            Self::FriendMessage { .. } => "friend_message",
            Self::ConferenceInvite { .. } => "conference_invite",
            Self::ConferenceTitle { .. } => "conference_title",
        }
    }
}

/// Friends, private messages and the bot's own profile.
pub trait Messenger {
    /// Send a private message to a friend.
    fn send_text(&mut self, friend: FriendId, text: &str) -> Result<(), EngineError>;

    /// Display name of a friend, or a placeholder if unknown.
    fn display_name(&self, friend: FriendId) -> String;

    /// Long-term key of a friend.
    fn public_key(&self, friend: FriendId) -> Option<PublicKey>;

    /// Accept a friend request.
    fn add_friend(&mut self, key: PublicKey) -> Result<FriendId, EngineError>;

    /// Remove a friend. Returns `false` if the friend did not exist.
    fn delete_friend(&mut self, friend: FriendId) -> bool;

    /// All current friends.
    fn friends(&self) -> Vec<FriendId>;

    /// Unix time the friend was last seen online. Friends who are online
    /// right now report the current time.
    fn last_online(&self, friend: FriendId) -> Option<u64>;

    fn friend_count(&self) -> usize;

    fn online_friend_count(&self) -> usize;

    /// The bot's own shareable address.
    fn self_address(&self) -> Address;

    fn self_name(&self) -> String;

    fn set_name(&mut self, name: &str);

    fn set_status(&mut self, status: UserStatus);

    fn set_status_message(&mut self, message: &str);
}

/// Conference (group room) administration.
pub trait Conferences {
    /// Create a new room owned by the bot.
    fn create(&mut self, kind: RoomKind) -> Result<RoomId, EngineError>;

    /// Join a room using the cookie from a friend's invite.
    fn join(&mut self, friend: FriendId, kind: RoomKind, cookie: &[u8]) -> Result<RoomId, EngineError>;

    /// Leave and destroy a room. Returns `false` if it did not exist.
    fn delete(&mut self, room: RoomId) -> bool;

    /// Invite a friend into a room.
    fn invite(&mut self, friend: FriendId, room: RoomId) -> bool;

    /// Number of peers in a room, the bot included.
    fn member_count(&self, room: RoomId) -> Result<u32, EngineError>;

    fn set_title(&mut self, room: RoomId, title: &str) -> bool;

    /// Broadcast a message to a room.
    fn send_message(&mut self, room: RoomId, text: &str) -> bool;

    /// Every room the bot is currently in.
    fn list(&self) -> Vec<RoomId>;
}

/// Opaque engine state for persistence.
pub trait Snapshot {
    fn snapshot(&self) -> Result<Vec<u8>, EngineError>;

    fn restore(&mut self, blob: &[u8]) -> Result<(), EngineError>;
}

/// Everything the bot needs from a messaging engine.
pub trait Engine: Messenger + Conferences + Snapshot + Send {}

impl<T: Messenger + Conferences + Snapshot + Send> Engine for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_kind_parse_is_case_insensitive() {
        assert_eq!(RoomKind::parse("TEXT"), Some(RoomKind::Text));
        assert_eq!(RoomKind::parse("Audio"), Some(RoomKind::AudioText));
        assert_eq!(RoomKind::parse("video"), None);
    }

    #[test]
    fn room_kind_labels() {
        assert_eq!(RoomKind::Text.label(), "Text");
        assert_eq!(RoomKind::AudioText.label(), "Audio");
    }

    #[test]
    fn user_status_parse() {
        assert_eq!(UserStatus::parse("busy"), Some(UserStatus::Busy));
        assert_eq!(UserStatus::parse("AWAY"), Some(UserStatus::Away));
        assert_eq!(UserStatus::parse("offline"), None);
    }

    #[test]
    fn room_id_parses_decimal() {
        assert_eq!("17".parse::<RoomId>(), Ok(RoomId(17)));
        assert!("-1".parse::<RoomId>().is_err());
        assert!("x".parse::<RoomId>().is_err());
    }

    #[test]
    fn engine_error_codes() {
        let err = EngineError::Failed {
            op: "join",
            code: 7,
        };
        assert_eq!(err.code(), 7);
        assert_eq!(err.to_string(), "join failed (error 7)");
    }
}
