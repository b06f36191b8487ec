//! Integration test common infrastructure.
//!
//! Builds a bot over the in-process engine with its files in a temporary
//! directory, and collects the replies each command produces.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use confbot::bot::Bot;
use confbot::commands::DispatchOutcome;
use confbot::config::Config;
use confbot::engine::FriendId;
use confbot::engine::local::LocalEngine;
use confbot::proto::PublicKey;
use tempfile::TempDir;

pub const MASTER: PublicKey = PublicKey([0x11; 32]);
pub const GUEST: PublicKey = PublicKey([0x22; 32]);
pub const BOT_KEY: PublicKey = PublicKey([0xB0; 32]);

/// A bot instance with one master friend and one guest friend.
pub struct TestBot {
    pub bot: Bot<LocalEngine>,
    pub dir: TempDir,
    pub master: FriendId,
    pub guest: FriendId,
}

impl TestBot {
    /// Spawn a bot whose master list contains [`MASTER`].
    pub fn spawn() -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("masterkeys"), format!("{}\n", MASTER.to_hex()))?;
        Self::spawn_in(dir)
    }

    /// Spawn a bot over an existing directory, loading any saved state.
    pub fn spawn_in(dir: TempDir) -> anyhow::Result<Self> {
        let config = Self::config(&dir)?;
        let mut bot = Bot::from_config(LocalEngine::with_identity(BOT_KEY, 1), &config);
        bot.load();
        let master = bot.engine_mut().add_contact(MASTER, "master", true);
        let guest = bot.engine_mut().add_contact(GUEST, "guest", true);
        Ok(Self {
            bot,
            dir,
            master,
            guest,
        })
    }

    /// Configuration pointing every file into `dir`, with no sweep grace.
    pub fn config(dir: &TempDir) -> anyhow::Result<Config> {
        let path = |name: &str| dir.path().join(name).display().to_string();
        let text = format!(
            r#"
[files]
data = "{}"
masters = "{}"
blocked = "{}"

[maintenance]
empty_room_grace = 0
"#,
            path("confbot_save"),
            path("masterkeys"),
            path("blockedkeys"),
        );
        Ok(toml::from_str(&text)?)
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Deliver `line` from `friend` and return the outcome plus every reply.
    pub fn send(&mut self, friend: FriendId, line: &str) -> (Option<DispatchOutcome>, Vec<String>) {
        let outcome = self.bot.on_friend_message(friend, line);
        let replies = self
            .bot
            .engine_mut()
            .take_outbox()
            .into_iter()
            .map(|out| out.text)
            .collect();
        (outcome, replies)
    }

    pub fn as_master(&mut self, line: &str) -> (Option<DispatchOutcome>, Vec<String>) {
        self.send(self.master, line)
    }

    pub fn as_guest(&mut self, line: &str) -> (Option<DispatchOutcome>, Vec<String>) {
        self.send(self.guest, line)
    }

    /// Add another online friend.
    pub fn befriend(&mut self, key: PublicKey, name: &str) -> FriendId {
        self.bot.engine_mut().add_contact(key, name, true)
    }
}
