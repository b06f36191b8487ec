mod common;

use std::sync::Arc;
use std::time::Duration;

use common::TestBot;
use confbot::config::MaintenanceConfig;
use confbot::engine::{Conferences, RoomId};
use confbot::maintenance::spawn_maintenance_task;
use parking_lot::Mutex;

#[tokio::test]
async fn test_maintenance_task_sweeps_empty_rooms() -> anyhow::Result<()> {
    let mut t = TestBot::spawn()?;
    t.as_master("create-room text");
    t.as_master("create-room text");
    t.as_guest("invite 1");

    let TestBot { bot, dir, .. } = t;
    let shared = Arc::new(Mutex::new(bot));
    let config = MaintenanceConfig {
        friend_purge_interval: 3600,
        room_sweep_interval: 3600,
        empty_room_grace: 0,
    };
    let handle = spawn_maintenance_task(Arc::clone(&shared), config);

    // Intervals fire immediately, so the first sweep runs right away.
    for _ in 0..100 {
        if shared.lock().rooms().active_count() == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    handle.abort();

    let bot = shared.lock();
    assert_eq!(bot.rooms().active_count(), 1);
    assert!(bot.rooms().find(RoomId(1)).is_some());
    assert_eq!(bot.engine().list(), [RoomId(1)]);
    drop(bot);
    drop(dir);
    Ok(())
}
