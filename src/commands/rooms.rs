//! Room lifecycle, access and broadcast commands.

use confbot_proto::{MAX_NAME_LENGTH, MAX_PASSWORD_SIZE, Token};
use tracing::{error, info, warn};

use super::{CommandResult, Context, parse_room, reply};
use crate::engine::{EngineError, RoomKind};
use crate::error::CommandError;

/// `create-room <text|audio> [password]`
pub fn create_room(ctx: &mut Context<'_>, args: &[Token]) -> CommandResult {
    let kind_arg = args
        .first()
        .ok_or_else(|| CommandError::invalid("Please specify the room type: audio or text"))?;
    let kind = RoomKind::parse(kind_arg.as_str())
        .ok_or_else(|| CommandError::invalid("Invalid room type. Valid types are: text and audio."))?;

    let password = args.get(1).map(Token::as_str);
    if password.is_some_and(|pw| pw.len() >= MAX_PASSWORD_SIZE) {
        return Err(CommandError::invalid("Room creation failed: Password too long"));
    }

    let room = ctx
        .engine
        .create(kind)
        .map_err(|source| CommandError::engine("Room instance failed to initialize.", source))?;

    if let Err(err) = ctx.rooms.add(room, kind, password) {
        error!(room = %room, error = %err, "Registry insert failed; deleting orphaned room");
        if !ctx.engine.delete(room) {
            error!(room = %room, "Failed to delete orphaned room");
        }
        return Err(err.into());
    }

    info!(
        room = %room,
        kind = kind.label(),
        protected = password.is_some(),
        sender = %ctx.sender.name,
        "Room created"
    );
    let suffix = if password.is_some() {
        " (password protected)"
    } else {
        ""
    };
    Ok(reply(format!("Room {room} created{suffix}")))
}

/// `invite [room] [password]`
pub fn invite(ctx: &mut Context<'_>, args: &[Token]) -> CommandResult {
    let room = match args.first() {
        Some(token) => parse_room(token)?,
        None => ctx.state.default_room,
    };
    let record = ctx
        .rooms
        .record(room)
        .ok_or_else(|| CommandError::invalid("Room doesn't exist."))?;

    let offered = args.get(1).map(Token::as_str);
    if !record.check_password(offered) {
        warn!(
            room = %room,
            sender = %ctx.sender.name,
            friend = %ctx.sender.friend,
            "Invite refused: wrong password"
        );
        return Err(CommandError::invalid("Invalid password."));
    }

    if !ctx.engine.invite(ctx.sender.friend, room) {
        return Err(CommandError::engine(
            "Invite failed.",
            EngineError::Failed {
                op: "invite",
                code: -1,
            },
        ));
    }

    info!(room = %room, sender = %ctx.sender.name, "Invited friend to room");
    Ok(reply(format!("Invite sent for room {room}.")))
}

/// `leave-room <room>`
pub fn leave_room(ctx: &mut Context<'_>, args: &[Token]) -> CommandResult {
    let token = args
        .first()
        .ok_or_else(|| CommandError::invalid("Error: Room number required"))?;
    let room = parse_room(token)?;

    if !ctx.engine.delete(room) {
        return Err(CommandError::invalid("Error: Invalid room number"));
    }
    ctx.rooms.remove(room);

    info!(room = %room, sender = %ctx.sender.name, "Left room");
    Ok(reply(format!("Left room {room}")))
}

/// `set-password <room> [password]`
pub fn set_password(ctx: &mut Context<'_>, args: &[Token]) -> CommandResult {
    let token = args
        .first()
        .ok_or_else(|| CommandError::invalid("Error: Room number required"))?;
    let room = parse_room(token)?;
    let record = ctx
        .rooms
        .record_mut(room)
        .ok_or_else(|| CommandError::invalid("Error: Invalid room number"))?;

    let Some(password) = args.get(1).map(Token::as_str) else {
        record.set_password(None);
        info!(room = %room, sender = %ctx.sender.name, "Room password cleared");
        return Ok(reply("No password set"));
    };

    if password.len() >= MAX_PASSWORD_SIZE {
        return Err(CommandError::invalid("Error: Password too long"));
    }
    record.set_password(Some(password));
    info!(room = %room, sender = %ctx.sender.name, "Room password set");
    Ok(reply("Password set"))
}

/// `set-title <room> "<title>"`
pub fn set_title(ctx: &mut Context<'_>, args: &[Token]) -> CommandResult {
    let [room_arg, title, ..] = args else {
        return Err(CommandError::invalid("Error: Two arguments are required"));
    };
    if !title.is_quoted() {
        return Err(CommandError::invalid("Error: Title must be enclosed in quotes"));
    }
    let room = parse_room(room_arg)?;
    if ctx.rooms.find(room).is_none() {
        return Err(CommandError::invalid("Error: Invalid room number"));
    }
    if title.len() > MAX_NAME_LENGTH {
        return Err(CommandError::invalid("Error: Title is too long"));
    }

    if !ctx.engine.set_title(room, title.as_str()) {
        return Err(CommandError::engine(
            "Failed to set title. This may be caused by an invalid room number or an empty room",
            EngineError::Failed {
                op: "set_title",
                code: -1,
            },
        ));
    }
    if let Some(record) = ctx.rooms.record_mut(room) {
        record.set_title(title.as_str());
    }

    info!(room = %room, title = %title, sender = %ctx.sender.name, "Room title set");
    Ok(reply("Room title set"))
}

/// `room-message <room> "<message>"`
pub fn room_message(ctx: &mut Context<'_>, args: &[Token]) -> CommandResult {
    let token = args
        .first()
        .ok_or_else(|| CommandError::invalid("Error: Room number required"))?;
    let message = args
        .get(1)
        .ok_or_else(|| CommandError::invalid("Error: Message required"))?;
    let room = parse_room(token)?;
    if ctx.rooms.find(room).is_none() {
        return Err(CommandError::invalid("Error: Invalid room number"));
    }
    if !message.is_quoted() {
        return Err(CommandError::invalid("Error: Message must be enclosed in quotes"));
    }

    if !ctx.engine.send_message(room, message.as_str()) {
        return Err(CommandError::engine(
            "Error: Failed to send message.",
            EngineError::Failed {
                op: "send_message",
                code: -1,
            },
        ));
    }

    info!(room = %room, sender = %ctx.sender.name, message = %message, "Broadcast to room");
    Ok(reply("Message sent."))
}

#[cfg(test)]
mod tests {
    use super::super::DispatchOutcome;
    use super::super::test_support::Fixture;
    use crate::engine::{Conferences, RoomId, RoomKind};

    #[test]
    fn create_room_registers_room() {
        let mut fx = Fixture::new();
        let (outcome, replies) = fx.master("create-room text");
        assert_eq!(outcome, DispatchOutcome::Completed);
        assert_eq!(replies, ["Room 0 created"]);

        let record = fx.rooms.record(RoomId(0)).unwrap();
        assert_eq!(record.kind, RoomKind::Text);
        assert!(!record.has_password());
        assert_eq!(fx.engine.list(), [RoomId(0)]);
    }

    #[test]
    fn create_room_with_password() {
        let mut fx = Fixture::new();
        let (_, replies) = fx.master("create-room AUDIO hunter2");
        assert_eq!(replies, ["Room 0 created (password protected)"]);
        let record = fx.rooms.record(RoomId(0)).unwrap();
        assert_eq!(record.kind, RoomKind::AudioText);
        assert_eq!(record.password(), Some("hunter2"));
    }

    #[test]
    fn create_room_validation() {
        let mut fx = Fixture::new();
        let (outcome, replies) = fx.master("create-room");
        assert_eq!(outcome, DispatchOutcome::Rejected);
        assert_eq!(replies, ["Please specify the room type: audio or text"]);

        let (_, replies) = fx.master("create-room video");
        assert_eq!(replies, ["Invalid room type. Valid types are: text and audio."]);

        let long = "p".repeat(64);
        let (_, replies) = fx.master(&format!("create-room text {long}"));
        assert_eq!(replies, ["Room creation failed: Password too long"]);

        assert!(fx.engine.list().is_empty());
        assert!(fx.rooms.is_empty());
    }

    #[test]
    fn create_room_rolls_back_when_registry_full() {
        let mut fx = Fixture::new();
        fx.rooms = crate::state::RoomRegistry::new(1);
        fx.master("create-room text");
        let (outcome, _) = fx.master("create-room text");
        assert_eq!(outcome, DispatchOutcome::Rejected);
        assert_eq!(fx.engine.list(), [RoomId(0)]);
        assert_eq!(fx.rooms.active_count(), 1);
    }

    #[test]
    fn failed_rollback_still_rejects() {
        let mut fx = Fixture::new();
        fx.rooms = crate::state::RoomRegistry::new(1);
        fx.master("create-room text");
        fx.engine.pin_room(RoomId(1));
        let (outcome, replies) = fx.master("create-room text");
        assert_eq!(outcome, DispatchOutcome::Rejected);
        assert_eq!(replies, ["Room creation failed: too many active rooms"]);
        assert_eq!(fx.engine.list(), [RoomId(0), RoomId(1)]);
        assert_eq!(fx.rooms.active_count(), 1);
    }

    #[test]
    fn leave_room_releases_slot() {
        let mut fx = Fixture::new();
        fx.master("create-room text");
        let (outcome, replies) = fx.master("leave-room 0");
        assert_eq!(outcome, DispatchOutcome::Completed);
        assert_eq!(replies, ["Left room 0"]);
        assert!(fx.rooms.is_empty());
        assert!(fx.engine.list().is_empty());

        let (_, replies) = fx.master("leave-room 0");
        assert_eq!(replies, ["Error: Invalid room number"]);
        let (_, replies) = fx.master("leave-room zero");
        assert_eq!(replies, ["Error: Invalid room number"]);
    }

    #[test]
    fn invite_uses_default_room() {
        let mut fx = Fixture::new();
        fx.master("create-room text");
        let (outcome, replies) = fx.stranger("invite");
        assert_eq!(outcome, DispatchOutcome::Completed);
        assert_eq!(replies, ["Invite sent for room 0."]);
        assert!(fx.engine.is_member(RoomId(0), fx.stranger));
    }

    #[test]
    fn invite_checks_password() {
        let mut fx = Fixture::new();
        fx.master("create-room text secret");

        let (outcome, replies) = fx.stranger("invite 0");
        assert_eq!(outcome, DispatchOutcome::Rejected);
        assert_eq!(replies, ["Invalid password."]);
        let (_, replies) = fx.stranger("invite 0 wrong");
        assert_eq!(replies, ["Invalid password."]);
        assert!(!fx.engine.is_member(RoomId(0), fx.stranger));

        let (outcome, _) = fx.stranger("invite 0 secret");
        assert_eq!(outcome, DispatchOutcome::Completed);
        assert!(fx.engine.is_member(RoomId(0), fx.stranger));
    }

    #[test]
    fn invite_to_missing_room() {
        let mut fx = Fixture::new();
        let (_, replies) = fx.stranger("invite 4");
        assert_eq!(replies, ["Room doesn't exist."]);
        let (_, replies) = fx.stranger("invite");
        assert_eq!(replies, ["Room doesn't exist."]);
    }

    #[test]
    fn set_password_sets_and_clears() {
        let mut fx = Fixture::new();
        fx.master("create-room text");

        let (_, replies) = fx.master("set-password 0 letmein");
        assert_eq!(replies, ["Password set"]);
        assert_eq!(fx.rooms.record(RoomId(0)).unwrap().password(), Some("letmein"));

        let (_, replies) = fx.master("set-password 0");
        assert_eq!(replies, ["No password set"]);
        assert!(!fx.rooms.record(RoomId(0)).unwrap().has_password());

        let (_, replies) = fx.master(&format!("set-password 0 {}", "x".repeat(64)));
        assert_eq!(replies, ["Error: Password too long"]);
        let (_, replies) = fx.master("set-password 3 pw");
        assert_eq!(replies, ["Error: Invalid room number"]);
    }

    #[test]
    fn set_title_requires_quotes() {
        let mut fx = Fixture::new();
        fx.master("create-room text");

        let (_, replies) = fx.master("set-title 0 Standup");
        assert_eq!(replies, ["Error: Title must be enclosed in quotes"]);
        let (_, replies) = fx.master("set-title 0");
        assert_eq!(replies, ["Error: Two arguments are required"]);

        let (outcome, replies) = fx.master("set-title 0 \"Daily Standup\"");
        assert_eq!(outcome, DispatchOutcome::Completed);
        assert_eq!(replies, ["Room title set"]);
        assert_eq!(fx.rooms.record(RoomId(0)).unwrap().title(), "Daily Standup");
        assert_eq!(fx.engine.conference_title(RoomId(0)), Some("Daily Standup"));
    }

    #[test]
    fn set_title_rejects_long_title_and_missing_room() {
        let mut fx = Fixture::new();
        fx.master("create-room text");
        let (_, replies) = fx.master(&format!("set-title 0 \"{}\"", "t".repeat(129)));
        assert_eq!(replies, ["Error: Title is too long"]);
        let (_, replies) = fx.master("set-title 5 \"x\"");
        assert_eq!(replies, ["Error: Invalid room number"]);
    }

    #[test]
    fn room_message_broadcasts() {
        let mut fx = Fixture::new();
        fx.master("create-room text");

        let (_, replies) = fx.master("room-message 0 hello");
        assert_eq!(replies, ["Error: Message must be enclosed in quotes"]);
        let (_, replies) = fx.master("room-message 0");
        assert_eq!(replies, ["Error: Message required"]);

        let (_, replies) = fx.master("room-message 0 \"hello everyone\"");
        assert_eq!(replies, ["Message sent."]);
        assert_eq!(fx.engine.conference_messages(RoomId(0)), ["hello everyone"]);
    }
}
