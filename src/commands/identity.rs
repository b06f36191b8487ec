//! The bot's own profile: name, presence and status message.

use confbot_proto::{MAX_NAME_LENGTH, MAX_STATUS_MESSAGE_LENGTH, Token, clamp_str};
use tracing::info;

use super::{BotEffect, CommandResult, Context};
use crate::engine::UserStatus;
use crate::error::CommandError;

/// `rename-self <name>`
pub fn rename_self(ctx: &mut Context<'_>, args: &[Token]) -> CommandResult {
    let name = args
        .first()
        .map(|token| clamp_str(token.as_str(), MAX_NAME_LENGTH))
        .filter(|name| !name.is_empty())
        .ok_or_else(|| CommandError::invalid("Error: Name required"))?;

    ctx.engine.set_name(name);
    info!(name, sender = %ctx.sender.name, "Display name changed");
    Ok(vec![
        BotEffect::Reply(format!("Name set to {name}")),
        BotEffect::SaveState,
    ])
}

/// `set-status <online|away|busy>`
pub fn set_status(ctx: &mut Context<'_>, args: &[Token]) -> CommandResult {
    let arg = args
        .first()
        .ok_or_else(|| CommandError::invalid("Error: Status required"))?;
    let status = UserStatus::parse(arg.as_str()).ok_or_else(|| {
        CommandError::invalid("Invalid status. Valid statuses are: online, busy and away.")
    })?;

    ctx.engine.set_status(status);
    info!(status = %status, sender = %ctx.sender.name, "Presence changed");
    Ok(vec![
        BotEffect::Reply(format!("Status set to {status}")),
        BotEffect::SaveState,
    ])
}

/// `set-status-message "<message>"`
pub fn set_status_message(ctx: &mut Context<'_>, args: &[Token]) -> CommandResult {
    let message = args
        .first()
        .ok_or_else(|| CommandError::invalid("Error: Message required"))?;
    if !message.is_quoted() {
        return Err(CommandError::invalid("Error: Message must be enclosed in quotes"));
    }
    let message = clamp_str(message.as_str(), MAX_STATUS_MESSAGE_LENGTH);

    ctx.engine.set_status_message(message);
    info!(message, sender = %ctx.sender.name, "Status message changed");
    Ok(vec![
        BotEffect::Reply("Status message set".to_string()),
        BotEffect::SaveState,
    ])
}
