//! Periodic housekeeping.
//!
//! Runs on the tokio runtime alongside the event loop. Each tick takes the
//! bot lock briefly and never holds it across an await.

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::bot::SharedBot;
use crate::config::MaintenanceConfig;
use crate::engine::Engine;
use crate::state::unix_now;

/// Spawn the background task that purges inactive friends and sweeps empty
/// rooms. Abort the returned handle to stop it.
pub fn spawn_maintenance_task<E: Engine + 'static>(
    bot: SharedBot<E>,
    config: MaintenanceConfig,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut purge = tokio::time::interval(config.purge_period());
        let mut sweep = tokio::time::interval(config.sweep_period());
        purge.set_missed_tick_behavior(MissedTickBehavior::Delay);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = purge.tick() => {
                    let purged = bot.lock().purge_inactive_friends(unix_now());
                    debug!(purged, "Friend purge pass complete");
                }
                _ = sweep.tick() => {
                    let removed = bot.lock().sweep_empty_rooms(config.grace());
                    debug!(removed, "Room sweep pass complete");
                }
            }
        }
    })
}
