//! Registry limits configuration.

use serde::Deserialize;

use crate::state::DEFAULT_MAX_ROOMS;

/// Registry limits configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum number of registry slots (default: 512).
    /// Room creation and invite acceptance fail once every slot is taken.
    #[serde(default = "default_max_rooms")]
    pub max_rooms: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_rooms: default_max_rooms(),
        }
    }
}

fn default_max_rooms() -> usize {
    DEFAULT_MAX_ROOMS
}
