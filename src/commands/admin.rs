//! Bot-wide settings and the master list.

use confbot_proto::{PublicKey, Token};
use tracing::info;

use super::{BotEffect, CommandResult, Context, parse_room, reply};
use crate::error::CommandError;
use crate::state::SECONDS_IN_DAY;

/// `set-default <room>`
pub fn set_default(ctx: &mut Context<'_>, args: &[Token]) -> CommandResult {
    let token = args
        .first()
        .ok_or_else(|| CommandError::invalid("Error: Room number required"))?;
    let room = parse_room(token)?;

    ctx.state.default_room = room;
    info!(room = %room, sender = %ctx.sender.name, "Default room changed");
    Ok(vec![
        BotEffect::Reply(format!("Default room number set to {room}")),
        BotEffect::SaveState,
    ])
}

/// `set-purge <days>`
pub fn set_purge(ctx: &mut Context<'_>, args: &[Token]) -> CommandResult {
    let invalid = || CommandError::invalid("Error: Number of days (> 0) required");
    let days: u64 = args
        .first()
        .and_then(|token| token.as_str().parse().ok())
        .filter(|&days| days > 0)
        .ok_or_else(invalid)?;
    let limit = days.checked_mul(SECONDS_IN_DAY).ok_or_else(invalid)?;

    ctx.state.inactive_limit = limit;
    info!(days, sender = %ctx.sender.name, "Friend purge threshold changed");
    Ok(vec![
        BotEffect::Reply(format!("Purge time set to {days} days")),
        BotEffect::SaveState,
    ])
}

/// `add-master <address>`
pub fn add_master(ctx: &mut Context<'_>, args: &[Token]) -> CommandResult {
    let entry = args
        .first()
        .ok_or_else(|| CommandError::invalid("Error: Address required"))?;
    let key: PublicKey = entry
        .as_str()
        .parse()
        .map_err(|_| CommandError::invalid("Error: Invalid address"))?;

    if ctx.gate.is_privileged(&key) {
        return Ok(reply("Address is already in the masterkeys list"));
    }
    ctx.gate
        .masters()
        .append_key(entry.as_str())
        .map_err(|source| CommandError::store("Error: Could not update the masterkeys list", source))?;

    info!(key = %key, sender = %ctx.sender.name, "Master added");
    Ok(reply("Address added to the masterkeys list"))
}
