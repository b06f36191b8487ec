//! Effects produced by command handlers.
//!
//! Handlers describe what should happen; the dispatcher applies it. This
//! keeps handlers free of delivery and persistence concerns and lets tests
//! inspect the effects directly.

use tracing::warn;

use crate::engine::{Engine, FriendId};
use crate::state::{BotState, DataStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotEffect {
    /// Send a private message back to the command's sender.
    Reply(String),
    /// Persist the engine snapshot and bot settings.
    SaveState,
}

/// Apply effects in order.
pub fn apply_effects(
    engine: &mut dyn Engine,
    store: &DataStore,
    state: &BotState,
    target: FriendId,
    effects: Vec<BotEffect>,
) {
    for effect in effects {
        match effect {
            BotEffect::Reply(text) => send_reply(engine, target, &text),
            BotEffect::SaveState => {
                store.persist(&*engine, state);
            }
        }
    }
}

/// Send one private message, logging delivery failures.
pub fn send_reply(engine: &mut dyn Engine, target: FriendId, text: &str) {
    if let Err(e) = engine.send_text(target, text) {
        warn!(friend = %target, error = %e, "Failed to deliver reply");
    }
}
