//! Unified error handling for confbot.
//!
//! Command handlers return [`CommandError`]; the dispatcher turns it into
//! the single reply the sender sees and a log line for the operator.

use std::path::PathBuf;

use thiserror::Error;

use crate::engine::EngineError;

// ============================================================================
// Command Errors (handler outcomes)
// ============================================================================

/// Errors a command handler can end with.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The arguments failed validation. The text is sent back as-is.
    #[error("{0}")]
    Invalid(String),

    /// The engine refused an operation.
    #[error("{reply}: {source}")]
    Engine {
        reply: &'static str,
        #[source]
        source: EngineError,
    },

    /// A key list or state file could not be updated.
    #[error("{reply}: {source}")]
    Store {
        reply: &'static str,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl CommandError {
    pub fn invalid(reply: impl Into<String>) -> Self {
        Self::Invalid(reply.into())
    }

    pub fn engine(reply: &'static str, source: EngineError) -> Self {
        Self::Engine { reply, source }
    }

    pub fn store(reply: &'static str, source: StoreError) -> Self {
        Self::Store { reply, source }
    }

    /// Text sent back to the friend who issued the command.
    pub fn reply_text(&self) -> &str {
        match self {
            Self::Invalid(reply) => reply.as_str(),
            Self::Engine { reply, .. } | Self::Store { reply, .. } => *reply,
            Self::Registry(_) => "Room creation failed: too many active rooms",
        }
    }

    /// Get a static error code string for log labeling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Invalid(_) => "invalid",
            Self::Engine { .. } => "engine",
            Self::Store { .. } => "store",
            Self::Registry(_) => "registry_full",
        }
    }
}

// ============================================================================
// Registry Errors
// ============================================================================

/// Errors from the room registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("room registry is full (limit {limit})")]
    Full { limit: usize },
}

// ============================================================================
// Store Errors (files on disk)
// ============================================================================

/// Errors reading or writing the bot's files.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a valid save file: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },
}

impl StoreError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Read { path, .. } | Self::Write { path, .. } | Self::Corrupt { path, .. } => path,
        }
    }
}
