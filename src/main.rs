//! confbot - conference room administration bot.
//!
//! Runs the bot over the in-process engine. Lines typed on stdin are
//! delivered as private messages from the console operator friend.

use std::sync::Arc;

use anyhow::Context as _;
use confbot::bot::Bot;
use confbot::config::Config;
use confbot::engine::EngineEvent;
use confbot::engine::local::LocalEngine;
use confbot::maintenance::spawn_maintenance_task;
use confbot::proto::PublicKey;
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "confbot.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    info!(name = %config.bot.name, "Starting confbot");

    let operator_key = match &config.console.operator_key {
        Some(hex) => hex
            .parse::<PublicKey>()
            .context("console.operator_key is not a valid key or address")?,
        None => PublicKey(rand::random()),
    };

    let mut bot = Bot::from_config(LocalEngine::new(), &config);
    bot.load();

    let operator = bot
        .engine_mut()
        .add_contact(operator_key, &config.console.operator_name, true);
    bot.engine_mut().set_console(Some(operator));
    if !bot.gate().is_privileged(&operator_key) {
        warn!(
            key = %operator_key,
            masters = %config.files.masters.display(),
            "Console operator is not a master; privileged commands will be refused"
        );
    }
    bot.log_profile();

    let bot = Arc::new(Mutex::new(bot));
    let maintenance = spawn_maintenance_task(Arc::clone(&bot), config.maintenance.clone());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(text)) => {
                    bot.lock().handle_event(EngineEvent::FriendMessage { friend: operator, text });
                }
                Ok(None) => {
                    info!("Console closed");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to read console input");
                    break;
                }
            },
            _ = &mut shutdown => {
                info!("Received interrupt");
                break;
            }
        }
    }

    maintenance.abort();
    bot.lock().shutdown();
    Ok(())
}
