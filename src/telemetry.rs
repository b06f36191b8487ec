//! Telemetry utilities for command timing and event correlation.

use std::time::Instant;

use tracing::debug;

/// Guard for timing command execution.
///
/// Logs command latency at debug level when dropped.
pub struct CommandTimer {
    command: &'static str,
    start: Instant,
}

impl CommandTimer {
    /// Start timing a command.
    pub fn new(command: &'static str) -> Self {
        Self {
            command,
            start: Instant::now(),
        }
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        let elapsed_us = self.start.elapsed().as_micros() as u64;
        debug!(command = self.command, elapsed_us, "Command finished");
    }
}

/// Span constructors shared across the crate.
pub mod spans {
    use tracing::{Span, info_span};

    /// Span for one engine callback.
    pub fn event(kind: &'static str) -> Span {
        info_span!("event", kind = kind)
    }

    /// Span for one dispatched command.
    pub fn command(name: &str, sender: &str) -> Span {
        info_span!("command", name = %name, sender = %sender)
    }

    /// Span for a periodic maintenance pass.
    pub fn maintenance(task: &'static str) -> Span {
        info_span!("maintenance", task = task)
    }
}
