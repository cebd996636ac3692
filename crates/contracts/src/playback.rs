//! Media player collaborator contracts
//!
//! The engine never owns the playback clock. It polls [`PlaybackClock`] for
//! position and transport state, and drives the player through
//! [`TransportControl`]. Both are injected so tests can use a deterministic
//! fake instead of a live player.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{AssetHandle, AssetLocator, ContractError};

/// Transport state as reported by the media player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportState {
    /// Nothing playing yet
    #[default]
    Idle,
    Playing,
    /// Paused externally (user, interruption)
    Paused,
    /// Reached the end of the asset
    Ended,
}

impl TransportState {
    /// Whether this state ends an engine playback run
    pub fn halts_playback(self) -> bool {
        matches!(self, Self::Paused | Self::Ended)
    }
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Ended => "ended",
        };
        f.write_str(name)
    }
}

/// One reading of the playback clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockSample {
    /// Current playback position; monotonic while playing, may regress on seek
    pub position: Duration,
    pub transport: TransportState,
}

impl ClockSample {
    pub fn playing_at(position: Duration) -> Self {
        Self {
            position,
            transport: TransportState::Playing,
        }
    }
}

/// Transport change callback type
///
/// Invoked by the player, possibly on its own notification thread.
pub type TransportCallback = Arc<dyn Fn(TransportState) + Send + Sync>;

/// Read-only view of the player's position
pub trait PlaybackClock: Send + Sync {
    /// Read position and transport state
    ///
    /// Must return promptly. A failed read is transient: the engine skips
    /// that tick and tries again on the next one.
    ///
    /// # Errors
    /// Returns [`ContractError::ClockRead`] when the position is unavailable.
    fn sample(&self) -> Result<ClockSample, ContractError>;
}

/// Imperative transport controls
pub trait TransportControl: Send + Sync {
    /// Prepare the asset for playback
    ///
    /// # Errors
    /// Returns [`ContractError::Load`] if the locator cannot be opened.
    fn load(&self, locator: &AssetLocator) -> Result<AssetHandle, ContractError>;

    fn play(&self) -> Result<(), ContractError>;

    fn pause(&self) -> Result<(), ContractError>;

    /// Stop playback and rewind to the start
    fn stop(&self) -> Result<(), ContractError>;

    /// Register the transport change callback
    ///
    /// Replaces any previously registered callback.
    fn on_transport_change(&self, callback: TransportCallback);
}

/// A full media player: clock plus transport
pub trait MediaPlayer: PlaybackClock + TransportControl {}

impl<T: PlaybackClock + TransportControl> MediaPlayer for T {}

impl<T: PlaybackClock + ?Sized> PlaybackClock for Arc<T> {
    fn sample(&self) -> Result<ClockSample, ContractError> {
        (**self).sample()
    }
}

impl<T: TransportControl + ?Sized> TransportControl for Arc<T> {
    fn load(&self, locator: &AssetLocator) -> Result<AssetHandle, ContractError> {
        (**self).load(locator)
    }

    fn play(&self) -> Result<(), ContractError> {
        (**self).play()
    }

    fn pause(&self) -> Result<(), ContractError> {
        (**self).pause()
    }

    fn stop(&self) -> Result<(), ContractError> {
        (**self).stop()
    }

    fn on_transport_change(&self, callback: TransportCallback) {
        (**self).on_transport_change(callback)
    }
}
