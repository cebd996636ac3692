//! Player state and session snapshot

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{AssetLocator, PageNumber};

/// Player transport state owned by the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    /// Nothing loaded
    #[default]
    Idle,
    /// Asset loaded, not playing
    Loaded,
    /// Polling loop running
    Playing,
    /// Halted by `stop` or by the transport ending/pausing
    Stopped,
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Loaded => "loaded",
            Self::Playing => "playing",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Point-in-time view of the engine's session (for diagnostics/tests)
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub state: PlayerState,
    pub page: PageNumber,
    /// Index of the next cue not yet fired on the active page
    pub cue_pointer: usize,
    pub last_known_position: Duration,
    pub locator: Option<AssetLocator>,
    /// Incremented on each `start`; identifies the running poll loop
    pub run_id: u64,
}
