//! Security module for confbot.
//!
//! Provides the permission gate that decides who may run privileged
//! commands and who is ignored outright:
//! - **Masters**: keys allowed to mutate rooms and the bot profile
//! - **Blocked**: keys whose friend requests and messages are dropped
//!
//! Both lists live in plain files and are re-read on every check.

pub mod keylist;

use std::sync::atomic::{AtomicBool, Ordering};

use confbot_proto::PublicKey;
use tracing::warn;

pub use keylist::KeyList;

/// A key list plus a flag so an unreadable file is reported once, not on
/// every message.
#[derive(Debug)]
struct GuardedList {
    list: KeyList,
    warned: AtomicBool,
}

impl GuardedList {
    fn new(list: KeyList) -> Self {
        Self {
            list,
            warned: AtomicBool::new(false),
        }
    }

    /// Membership check that fails closed.
    fn contains(&self, key: &PublicKey, role: &'static str) -> bool {
        match self.list.contains_key(key) {
            Ok(found) => {
                self.warned.store(false, Ordering::Relaxed);
                found
            }
            Err(e) => {
                if !self.warned.swap(true, Ordering::Relaxed) {
                    warn!(
                        list = role,
                        path = %self.list.path().display(),
                        error = %e,
                        "Key list unreadable; treating key as not listed"
                    );
                }
                false
            }
        }
    }
}

/// Decides whether a sender may run privileged commands.
#[derive(Debug)]
pub struct PermissionGate {
    masters: GuardedList,
    blocked: GuardedList,
}

impl PermissionGate {
    pub fn new(masters: KeyList, blocked: KeyList) -> Self {
        Self {
            masters: GuardedList::new(masters),
            blocked: GuardedList::new(blocked),
        }
    }

    /// Whether `key` is listed in the master key file. Read failures deny.
    pub fn is_privileged(&self, key: &PublicKey) -> bool {
        self.masters.contains(key, "masters")
    }

    /// Whether `key` is listed in the block file. Read failures allow.
    pub fn is_blocked(&self, key: &PublicKey) -> bool {
        self.blocked.contains(key, "blocked")
    }

    pub fn masters(&self) -> &KeyList {
        &self.masters.list
    }
}
