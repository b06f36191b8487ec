//! Command dispatch.
//!
//! A friend's private message is tokenized, looked up in the command
//! table, checked against the permission gate and handed to its handler.
//! Handlers return [`BotEffect`]s which the dispatcher applies. Every
//! failure path sends exactly one reply to the sender.
//!
//! Handlers are grouped by concern:
//! - [`rooms`]: room lifecycle, passwords, titles and broadcasts
//! - [`identity`]: the bot's own name and presence
//! - [`info`]: read-only queries (`help`, `id`, `info`)
//! - [`admin`]: bot-wide settings and the master list

mod admin;
mod effect;
mod identity;
mod info;
mod rooms;

use std::collections::HashMap;

use confbot_proto::{MAX_MESSAGE_LENGTH, PublicKey, Token, tokenize};
use tracing::{debug, error, warn};

use crate::engine::{Engine, FriendId, RoomId};
use crate::error::CommandError;
use crate::security::PermissionGate;
use crate::state::{BotState, DataStore, RoomRegistry};
use crate::telemetry::{CommandTimer, spans};

pub use effect::{BotEffect, apply_effects, send_reply};

/// Reply for unknown commands and unparseable lines.
pub const INVALID_COMMAND_REPLY: &str = "Invalid command. Type help for a list of commands";

/// Reply for privileged commands from unprivileged senders.
pub const DENIED_REPLY: &str = "You are not authorized to use this command.";

/// Result of a command handler.
pub type CommandResult = Result<Vec<BotEffect>, CommandError>;

/// Handler signature. `args` excludes the command name.
pub type HandlerFn = fn(&mut Context<'_>, &[Token]) -> CommandResult;

/// One entry of the command table.
pub struct CommandSpec {
    pub name: &'static str,
    pub usage: &'static str,
    pub summary: &'static str,
    /// Only senders in the master list may run this command.
    pub privileged: bool,
    pub handler: HandlerFn,
}

/// How a dispatched line ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The handler ran and succeeded.
    Completed,
    /// The handler ran and refused the arguments or hit an engine error.
    Rejected,
    /// The sender lacks the privilege the command needs.
    Denied,
    /// Unknown command name or unparseable line.
    Unrecognized,
    /// The line exceeds the message length limit.
    TooLong,
}

/// Who sent the command.
#[derive(Debug, Clone)]
pub struct Sender {
    pub friend: FriendId,
    /// `None` if the engine could not resolve the friend's key; such a
    /// sender is never privileged.
    pub key: Option<PublicKey>,
    pub name: String,
}

/// Everything a handler may touch.
pub struct Context<'a> {
    pub engine: &'a mut dyn Engine,
    pub state: &'a mut BotState,
    pub rooms: &'a mut RoomRegistry,
    pub gate: &'a PermissionGate,
    pub store: &'a DataStore,
    pub sender: &'a Sender,
}

impl Context<'_> {
    pub fn sender_is_privileged(&self) -> bool {
        self.sender
            .key
            .is_some_and(|key| self.gate.is_privileged(&key))
    }
}

/// Command table, sorted by name.
pub static COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "add-master",
        usage: "add-master <address>",
        summary: "Add a key or address to the master list",
        privileged: true,
        handler: admin::add_master,
    },
    CommandSpec {
        name: "create-room",
        usage: "create-room <text|audio> [password]",
        summary: "Create a new room, optionally password protected",
        privileged: true,
        handler: rooms::create_room,
    },
    CommandSpec {
        name: "help",
        usage: "help",
        summary: "Print this message",
        privileged: false,
        handler: info::help,
    },
    CommandSpec {
        name: "id",
        usage: "id",
        summary: "Print my address",
        privileged: false,
        handler: info::id,
    },
    CommandSpec {
        name: "info",
        usage: "info",
        summary: "Print my current status and list active rooms",
        privileged: false,
        handler: info::info,
    },
    // Public: a room's password, when set, is the only gate.
    CommandSpec {
        name: "invite",
        usage: "invite [room] [password]",
        summary: "Request an invite to a room (the default room if none is given)",
        privileged: false,
        handler: rooms::invite,
    },
    CommandSpec {
        name: "leave-room",
        usage: "leave-room <room>",
        summary: "Leave and destroy a room",
        privileged: true,
        handler: rooms::leave_room,
    },
    CommandSpec {
        name: "rename-self",
        usage: "rename-self <name>",
        summary: "Set my display name",
        privileged: true,
        handler: identity::rename_self,
    },
    CommandSpec {
        name: "room-message",
        usage: "room-message <room> \"<message>\"",
        summary: "Send a message to a room",
        privileged: true,
        handler: rooms::room_message,
    },
    CommandSpec {
        name: "set-default",
        usage: "set-default <room>",
        summary: "Set the room used by invite when none is given",
        privileged: true,
        handler: admin::set_default,
    },
    CommandSpec {
        name: "set-password",
        usage: "set-password <room> [password]",
        summary: "Set a room password, or clear it if none is given",
        privileged: true,
        handler: rooms::set_password,
    },
    CommandSpec {
        name: "set-purge",
        usage: "set-purge <days>",
        summary: "Purge friends inactive for this many days",
        privileged: true,
        handler: admin::set_purge,
    },
    CommandSpec {
        name: "set-status",
        usage: "set-status <online|away|busy>",
        summary: "Set my presence",
        privileged: true,
        handler: identity::set_status,
    },
    CommandSpec {
        name: "set-status-message",
        usage: "set-status-message \"<message>\"",
        summary: "Set my status message",
        privileged: true,
        handler: identity::set_status_message,
    },
    CommandSpec {
        name: "set-title",
        usage: "set-title <room> \"<title>\"",
        summary: "Set a room title",
        privileged: true,
        handler: rooms::set_title,
    },
];

/// Routes command lines to handlers.
pub struct Dispatcher {
    commands: HashMap<&'static str, &'static CommandSpec>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|spec| (spec.name, spec)).collect(),
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn lookup(&self, name: &str) -> Option<&'static CommandSpec> {
        self.commands.get(name).copied()
    }

    /// Run one command line from `ctx.sender`.
    pub fn execute(&self, ctx: &mut Context<'_>, line: &str) -> DispatchOutcome {
        let sender = ctx.sender;

        if line.len() >= MAX_MESSAGE_LENGTH {
            debug!(sender = %sender.name, len = line.len(), "Command line too long");
            send_reply(ctx.engine, sender.friend, INVALID_COMMAND_REPLY);
            return DispatchOutcome::TooLong;
        }

        let tokens = match tokenize(line) {
            Ok(tokens) => tokens,
            Err(e) => {
                debug!(sender = %sender.name, error = %e, "Unparseable command line");
                send_reply(ctx.engine, sender.friend, INVALID_COMMAND_REPLY);
                return DispatchOutcome::Unrecognized;
            }
        };

        let Some((spec, args)) = tokens
            .split_first()
            .and_then(|(name, args)| Some((self.lookup(name.as_str())?, args)))
        else {
            debug!(sender = %sender.name, line, "Unknown command");
            send_reply(ctx.engine, sender.friend, INVALID_COMMAND_REPLY);
            return DispatchOutcome::Unrecognized;
        };

        let _span = spans::command(spec.name, &sender.name).entered();
        let _timer = CommandTimer::new(spec.name);

        if spec.privileged && !ctx.sender_is_privileged() {
            warn!(
                sender = %sender.name,
                friend = %sender.friend,
                command = spec.name,
                "Unauthorized command attempt"
            );
            send_reply(ctx.engine, sender.friend, DENIED_REPLY);
            return DispatchOutcome::Denied;
        }

        match (spec.handler)(ctx, args) {
            Ok(effects) => {
                apply_effects(ctx.engine, ctx.store, &*ctx.state, sender.friend, effects);
                DispatchOutcome::Completed
            }
            Err(err) => {
                match &err {
                    CommandError::Invalid(_) => {
                        debug!(error = %err, "Command rejected");
                    }
                    CommandError::Engine { source, .. } => {
                        error!(
                            error = %err,
                            code = source.code(),
                            kind = err.error_code(),
                            "Command failed"
                        );
                    }
                    CommandError::Store { .. } | CommandError::Registry(_) => {
                        error!(error = %err, kind = err.error_code(), "Command failed");
                    }
                }
                send_reply(ctx.engine, sender.friend, err.reply_text());
                DispatchOutcome::Rejected
            }
        }
    }
}

/// Single reply effect.
pub(crate) fn reply(text: impl Into<String>) -> Vec<BotEffect> {
    vec![BotEffect::Reply(text.into())]
}

/// Parse a room number argument.
pub(crate) fn parse_room(token: &Token) -> Result<RoomId, CommandError> {
    token
        .as_str()
        .parse()
        .map_err(|_| CommandError::invalid("Error: Invalid room number"))
}
