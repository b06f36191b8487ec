//! confbot - conference room administration bot.
//!
//! Friends send the bot short text commands in private messages; the bot
//! creates and tears down conference rooms, gates invites behind optional
//! passwords and restricts administrative commands to a master key list.

pub mod bot;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod maintenance;
pub mod security;
pub mod state;
pub mod telemetry;

pub use confbot_proto as proto;
