//! Read-only queries.

use confbot_proto::Token;

use super::{BotEffect, COMMANDS, CommandResult, Context, reply};
use crate::state::{format_elapsed, unix_now};

/// `help`
///
/// Lists public commands for everyone, and privileged ones as well when the
/// sender is a master.
pub fn help(ctx: &mut Context<'_>, _args: &[Token]) -> CommandResult {
    let privileged = ctx.sender_is_privileged();
    let mut lines: Vec<BotEffect> = COMMANDS
        .iter()
        .filter(|spec| !spec.privileged)
        .map(|spec| BotEffect::Reply(format!("{} : {}", spec.usage, spec.summary)))
        .collect();

    if privileged {
        lines.push(BotEffect::Reply("Master commands:".to_string()));
        lines.extend(
            COMMANDS
                .iter()
                .filter(|spec| spec.privileged)
                .map(|spec| BotEffect::Reply(format!("{} : {}", spec.usage, spec.summary))),
        );
    }
    Ok(lines)
}

/// `id`
pub fn id(ctx: &mut Context<'_>, _args: &[Token]) -> CommandResult {
    Ok(reply(ctx.engine.self_address().to_hex()))
}

/// `info`
pub fn info(ctx: &mut Context<'_>, _args: &[Token]) -> CommandResult {
    let now = unix_now();
    let mut lines = vec![
        format!("Uptime: {}", format_elapsed(ctx.state.uptime(now))),
        format!(
            "Friends: {} ({} online)",
            ctx.engine.friend_count(),
            ctx.engine.online_friend_count()
        ),
        format!(
            "Inactive friends are purged after {} days",
            ctx.state.inactive_days()
        ),
    ];

    let before = lines.len();
    for record in ctx.rooms.iter_active() {
        let Ok(peers) = ctx.engine.member_count(record.room_id) else {
            continue;
        };
        let title = if record.title_len() == 0 {
            "None"
        } else {
            record.title()
        };
        lines.push(format!(
            "Room {} | {} | peers: {} | Title: {}",
            record.room_id,
            record.kind.label(),
            peers,
            title
        ));
    }
    if lines.len() == before {
        lines.push("No active rooms".to_string());
    }

    Ok(lines.into_iter().map(BotEffect::Reply).collect())
}
