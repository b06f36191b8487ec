//! Bot state persistence.
//!
//! The save file is a JSON document holding the runtime settings (default
//! room, purge threshold) and the engine's opaque snapshot, hex-encoded.
//! Writes go to a sibling temporary file first and are renamed into place,
//! so a crash mid-write never leaves a truncated save.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::BotState;
use crate::engine::{RoomId, Snapshot};
use crate::error::StoreError;

/// Contents of the save file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveFile {
    pub default_room: u32,
    pub inactive_limit: u64,
    engine: String,
}

impl SaveFile {
    pub fn new(state: &BotState, engine: &[u8]) -> Self {
        Self {
            default_room: state.default_room.0,
            inactive_limit: state.inactive_limit,
            engine: hex::encode(engine),
        }
    }

    /// The engine snapshot as saved.
    pub fn engine_blob(&self) -> Result<Vec<u8>, hex::FromHexError> {
        hex::decode(&self.engine)
    }

    /// Copy the saved settings into `state`.
    pub fn apply_to(&self, state: &mut BotState) {
        state.default_room = RoomId(self.default_room);
        state.inactive_limit = self.inactive_limit;
    }
}

/// File holding the bot's saved state.
#[derive(Debug, Clone)]
pub struct DataStore {
    path: PathBuf,
}

impl DataStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the raw saved bytes. A missing file is not an error.
    pub fn load(&self) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(&self.path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Read and decode the save file. A missing file is not an error.
    pub fn read(&self) -> Result<Option<SaveFile>, StoreError> {
        let Some(blob) = self.load()? else {
            return Ok(None);
        };
        serde_json::from_slice(&blob)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                path: self.path.clone(),
                reason: e.to_string(),
            })
    }

    /// Atomically replace the saved bytes.
    pub fn save(&self, blob: &[u8]) -> Result<(), StoreError> {
        let tmp = self.path.with_extension("tmp");
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        fs::write(&tmp, blob).map_err(write_err)?;
        fs::rename(&tmp, &self.path).map_err(write_err)
    }

    /// Snapshot `engine`, bundle it with `state` and save it, logging any
    /// failure. Returns whether the save went through.
    pub fn persist<S: Snapshot + ?Sized>(&self, engine: &S, state: &BotState) -> bool {
        let snapshot = match engine.snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Failed to snapshot engine state");
                return false;
            }
        };
        let blob = match serde_json::to_vec(&SaveFile::new(state, &snapshot)) {
            Ok(blob) => blob,
            Err(e) => {
                warn!(error = %e, "Failed to encode save file");
                return false;
            }
        };
        match self.save(&blob) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to save bot state");
                false
            }
        }
    }
}
