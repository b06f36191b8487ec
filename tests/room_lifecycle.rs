mod common;

use std::time::Duration;

use common::TestBot;
use confbot::commands::DispatchOutcome;
use confbot::engine::{Conferences, EngineEvent, RoomId, RoomKind};
use confbot::proto::PublicKey;

#[test]
fn test_create_and_leave_restores_registry() -> anyhow::Result<()> {
    let mut t = TestBot::spawn()?;

    let (outcome, replies) = t.as_master("create-room text");
    assert_eq!(outcome, Some(DispatchOutcome::Completed));
    assert_eq!(replies, ["Room 0 created"]);
    assert_eq!(t.bot.rooms().len(), 1);

    let (outcome, replies) = t.as_master("leave-room 0");
    assert_eq!(outcome, Some(DispatchOutcome::Completed));
    assert_eq!(replies, ["Left room 0"]);
    assert!(t.bot.rooms().is_empty());
    assert_eq!(t.bot.rooms().storage_len(), 0);
    assert!(t.bot.engine().list().is_empty());
    Ok(())
}

#[test]
fn test_registry_reuses_holes_and_trims_tail() -> anyhow::Result<()> {
    let mut t = TestBot::spawn()?;
    for _ in 0..4 {
        t.as_master("create-room text");
    }
    assert_eq!(t.bot.rooms().len(), 4);

    t.as_master("leave-room 1");
    assert_eq!(t.bot.rooms().len(), 4);
    assert_eq!(t.bot.rooms().storage_len(), 4);

    // The engine hands out number 1 again and the registry fills slot 1.
    t.as_master("create-room audio");
    assert_eq!(t.bot.rooms().find(RoomId(1)), Some(1));
    assert_eq!(t.bot.rooms().record(RoomId(1)).map(|r| r.kind), Some(RoomKind::AudioText));

    t.as_master("leave-room 3");
    t.as_master("leave-room 2");
    assert_eq!(t.bot.rooms().len(), 2);
    assert_eq!(t.bot.rooms().storage_len(), 2);
    Ok(())
}

#[test]
fn test_wrong_password_never_invites() -> anyhow::Result<()> {
    let mut t = TestBot::spawn()?;
    t.as_master("create-room text opensesame");

    for attempt in ["invite 0", "invite 0 opensesam", "invite 0 OPENSESAME", "invite 0 \"\""] {
        let (outcome, replies) = t.as_guest(attempt);
        assert_eq!(outcome, Some(DispatchOutcome::Rejected), "{attempt}");
        assert_eq!(replies, ["Invalid password."]);
    }
    assert_eq!(t.bot.engine().member_count(RoomId(0))?, 1);

    let (outcome, _) = t.as_guest("invite 0 opensesame");
    assert_eq!(outcome, Some(DispatchOutcome::Completed));
    assert_eq!(t.bot.engine().member_count(RoomId(0))?, 2);
    Ok(())
}

#[test]
fn test_quoted_password_with_spaces() -> anyhow::Result<()> {
    let mut t = TestBot::spawn()?;
    t.as_master("create-room text \"two words\"");
    assert_eq!(
        t.bot.rooms().record(RoomId(0)).and_then(|r| r.password()),
        Some("two words")
    );
    let (outcome, _) = t.as_guest("invite 0 \"two words\"");
    assert_eq!(outcome, Some(DispatchOutcome::Completed));
    Ok(())
}

#[test]
fn test_master_invite_is_accepted() -> anyhow::Result<()> {
    let mut t = TestBot::spawn()?;
    t.bot.handle_event(EngineEvent::ConferenceInvite {
        friend: t.master,
        kind: RoomKind::AudioText,
        cookie: b"cookie".to_vec(),
    });

    let record = t.bot.rooms().record(RoomId(0)).expect("room registered");
    assert_eq!(record.kind, RoomKind::AudioText);
    assert!(!record.has_password());
    assert!(t.bot.engine().is_member(RoomId(0), t.master));
    Ok(())
}

#[test]
fn test_guest_invite_is_ignored() -> anyhow::Result<()> {
    let mut t = TestBot::spawn()?;
    t.bot.handle_event(EngineEvent::ConferenceInvite {
        friend: t.guest,
        kind: RoomKind::Text,
        cookie: b"cookie".to_vec(),
    });
    assert!(t.bot.rooms().is_empty());
    assert!(t.bot.engine().list().is_empty());
    Ok(())
}

#[test]
fn test_failed_join_leaves_registry_untouched() -> anyhow::Result<()> {
    let mut t = TestBot::spawn()?;
    t.bot.handle_event(EngineEvent::ConferenceInvite {
        friend: t.master,
        kind: RoomKind::Text,
        cookie: Vec::new(),
    });
    assert!(t.bot.rooms().is_empty());
    Ok(())
}

#[test]
fn test_title_event_updates_registry() -> anyhow::Result<()> {
    let mut t = TestBot::spawn()?;
    t.as_master("create-room text");
    t.bot.handle_event(EngineEvent::ConferenceTitle {
        room: RoomId(0),
        title: "Renamed by a peer".to_string(),
    });
    assert_eq!(
        t.bot.rooms().record(RoomId(0)).map(|r| r.title().to_string()),
        Some("Renamed by a peer".to_string())
    );

    // Titles for unknown rooms are ignored.
    t.bot.handle_event(EngineEvent::ConferenceTitle {
        room: RoomId(9),
        title: "ghost".to_string(),
    });
    assert!(t.bot.rooms().record(RoomId(9)).is_none());
    Ok(())
}

#[test]
fn test_sweep_leaves_only_empty_rooms() -> anyhow::Result<()> {
    let mut t = TestBot::spawn()?;
    t.as_master("create-room text");
    t.as_master("create-room text");
    t.as_guest("invite 1");

    let removed = t.bot.sweep_empty_rooms(Duration::ZERO);
    assert_eq!(removed, 1);
    assert!(t.bot.rooms().find(RoomId(0)).is_none());
    assert!(t.bot.rooms().find(RoomId(1)).is_some());
    assert_eq!(t.bot.engine().list(), [RoomId(1)]);

    // Once the guest leaves, the second room goes too.
    t.bot.engine_mut().part_peer(RoomId(1), t.guest);
    assert_eq!(t.bot.sweep_empty_rooms(Duration::ZERO), 1);
    assert!(t.bot.rooms().is_empty());
    Ok(())
}

#[test]
fn test_sweep_respects_grace_period() -> anyhow::Result<()> {
    let mut t = TestBot::spawn()?;
    t.as_master("create-room text");
    assert_eq!(t.bot.sweep_empty_rooms(Duration::from_secs(3600)), 0);
    assert_eq!(t.bot.rooms().active_count(), 1);
    Ok(())
}

#[test]
fn test_sweep_forgets_rooms_the_engine_lost() -> anyhow::Result<()> {
    let mut t = TestBot::spawn()?;
    t.as_master("create-room text");
    t.bot.engine_mut().delete(RoomId(0));
    assert_eq!(t.bot.sweep_empty_rooms(Duration::ZERO), 1);
    assert!(t.bot.rooms().is_empty());
    Ok(())
}

#[test]
fn test_sweep_keeps_rooms_the_engine_refuses_to_leave() -> anyhow::Result<()> {
    let mut t = TestBot::spawn()?;
    t.as_master("create-room text");
    t.as_master("create-room text");
    t.bot.engine_mut().pin_room(RoomId(1));

    assert_eq!(t.bot.sweep_empty_rooms(Duration::ZERO), 1);
    assert!(t.bot.rooms().find(RoomId(0)).is_none());
    assert!(t.bot.rooms().find(RoomId(1)).is_some());
    assert_eq!(t.bot.rooms().storage_len(), t.bot.rooms().len());
    assert_eq!(t.bot.engine().list(), [RoomId(1)]);
    Ok(())
}

#[test]
fn test_room_message_reaches_room() -> anyhow::Result<()> {
    let mut t = TestBot::spawn()?;
    let other = t.befriend(PublicKey([0x33; 32]), "other");
    t.as_master("create-room text");
    t.send(other, "invite");

    let (outcome, _) = t.as_master("room-message 0 \"meeting starts now\"");
    assert_eq!(outcome, Some(DispatchOutcome::Completed));
    assert_eq!(t.bot.engine().conference_messages(RoomId(0)), ["meeting starts now"]);
    assert!(t.bot.engine().is_member(RoomId(0), other));
    Ok(())
}
