//! Wall-clock simulated player
//!
//! Position advances with real elapsed time while playing, using
//! `std::time::Instant` for monotonic guarantees. When an asset's duration is
//! known the player reports `Ended` once the position reaches it.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use contracts::{
    AssetHandle, AssetLocator, ClockSample, ContractError, PlaybackClock, TransportCallback,
    TransportControl, TransportState,
};
use tracing::{debug, info, instrument};

#[derive(Debug, Default)]
struct SimState {
    loaded: Option<AssetHandle>,
    transport: TransportState,
    /// When play was pressed (None unless playing)
    started_at: Option<Instant>,
    /// Position when play was pressed, or the frozen position otherwise
    base_position: Duration,
}

impl SimState {
    fn position_at(&self, now: Instant) -> Duration {
        match self.started_at {
            Some(started) => self.base_position + now.saturating_duration_since(started),
            None => self.base_position,
        }
    }

    fn duration(&self) -> Option<Duration> {
        self.loaded.as_ref().and_then(|h| h.duration)
    }
}

/// Simulated media player
pub struct SimulatedPlayer {
    /// Known asset durations (locator -> duration)
    library: HashMap<String, Option<Duration>>,
    /// Accept locators missing from the library (duration unknown)
    accept_unknown: bool,
    state: Mutex<SimState>,
    callback: Mutex<Option<TransportCallback>>,
}

impl SimulatedPlayer {
    /// Player that accepts any locator, with no known durations
    pub fn new() -> Self {
        Self {
            library: HashMap::new(),
            accept_unknown: true,
            state: Mutex::new(SimState::default()),
            callback: Mutex::new(None),
        }
    }

    /// Player that only loads locators present in `library`
    pub fn with_library<I, S>(library: I) -> Self
    where
        I: IntoIterator<Item = (S, Option<Duration>)>,
        S: Into<String>,
    {
        Self {
            library: library.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            accept_unknown: false,
            state: Mutex::new(SimState::default()),
            callback: Mutex::new(None),
        }
    }

    /// Jump to a position; playback continues from there if playing
    pub fn seek(&self, position: Duration) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.base_position = match state.duration() {
            Some(duration) => position.min(duration),
            None => position,
        };
        if state.started_at.is_some() {
            state.started_at = Some(Instant::now());
        }
        debug!(position_ms = position.as_millis() as u64, "simulated player seek");
    }

    /// Pause as if the user or an interruption did it (notifies the callback)
    pub fn interrupt(&self) {
        self.freeze(TransportState::Paused);
    }

    fn freeze(&self, transport: TransportState) {
        let changed = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            let now = Instant::now();
            state.base_position = state.position_at(now);
            state.started_at = None;
            let changed = state.transport != transport;
            state.transport = transport;
            changed
        };
        if changed {
            self.notify(transport);
        }
    }

    fn notify(&self, transport: TransportState) {
        let callback = self.callback.lock().unwrap_or_else(PoisonError::into_inner).clone();
        if let Some(callback) = callback {
            callback(transport);
        }
    }
}

impl Default for SimulatedPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackClock for SimulatedPlayer {
    fn sample(&self) -> Result<ClockSample, ContractError> {
        let (sample, ended) = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if state.loaded.is_none() {
                return Err(ContractError::clock_read("no asset loaded"));
            }

            let now = Instant::now();
            let mut position = state.position_at(now);
            let mut ended = false;
            if let Some(duration) = state.duration() {
                if state.transport == TransportState::Playing && position >= duration {
                    position = duration;
                    state.base_position = duration;
                    state.started_at = None;
                    state.transport = TransportState::Ended;
                    ended = true;
                }
            }
            (
                ClockSample {
                    position,
                    transport: state.transport,
                },
                ended,
            )
        };

        if ended {
            info!(position_ms = sample.position.as_millis() as u64, "simulated playback ended");
            self.notify(TransportState::Ended);
        }
        Ok(sample)
    }
}

impl TransportControl for SimulatedPlayer {
    #[instrument(name = "simulated_player_load", skip(self), fields(locator = %locator))]
    fn load(&self, locator: &AssetLocator) -> Result<AssetHandle, ContractError> {
        let duration = match self.library.get(locator.as_str()) {
            Some(duration) => *duration,
            None if self.accept_unknown => None,
            None => {
                return Err(ContractError::load(
                    locator.as_str(),
                    "asset not found in player library",
                ))
            }
        };

        let handle = AssetHandle {
            locator: locator.clone(),
            duration,
        };
        let changed = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.loaded = Some(handle.clone());
            state.started_at = None;
            state.base_position = Duration::ZERO;
            let changed = state.transport != TransportState::Idle;
            state.transport = TransportState::Idle;
            changed
        };
        if changed {
            self.notify(TransportState::Idle);
        }
        Ok(handle)
    }

    fn play(&self) -> Result<(), ContractError> {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if state.loaded.is_none() {
                return Err(ContractError::transport("play requested with no asset loaded"));
            }
            if state.transport == TransportState::Playing {
                return Ok(());
            }
            if state.transport == TransportState::Ended {
                state.base_position = Duration::ZERO;
            }
            state.started_at = Some(Instant::now());
            state.transport = TransportState::Playing;
        }
        self.notify(TransportState::Playing);
        Ok(())
    }

    fn pause(&self) -> Result<(), ContractError> {
        self.freeze(TransportState::Paused);
        Ok(())
    }

    fn stop(&self) -> Result<(), ContractError> {
        let changed = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.started_at = None;
            state.base_position = Duration::ZERO;
            let changed = state.transport != TransportState::Idle;
            state.transport = TransportState::Idle;
            changed
        };
        if changed {
            self.notify(TransportState::Idle);
        }
        Ok(())
    }

    fn on_transport_change(&self, callback: TransportCallback) {
        *self.callback.lock().unwrap_or_else(PoisonError::into_inner) = Some(callback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread::sleep;

    fn locator(raw: &str) -> AssetLocator {
        AssetLocator::parse(raw).unwrap()
    }

    #[test]
    fn test_position_advances_while_playing() {
        let player = SimulatedPlayer::new();
        player.load(&locator("file:///a.mp3")).unwrap();
        player.play().unwrap();
        sleep(Duration::from_millis(20));

        let sample = player.sample().unwrap();
        assert_eq!(sample.transport, TransportState::Playing);
        assert!(sample.position >= Duration::from_millis(20));
    }

    #[test]
    fn test_pause_freezes_position() {
        let player = SimulatedPlayer::new();
        player.load(&locator("file:///a.mp3")).unwrap();
        player.play().unwrap();
        sleep(Duration::from_millis(10));
        player.interrupt();

        let first = player.sample().unwrap();
        sleep(Duration::from_millis(10));
        let second = player.sample().unwrap();
        assert_eq!(first.position, second.position);
        assert_eq!(second.transport, TransportState::Paused);
    }

    #[test]
    fn test_ends_at_duration() {
        let player = SimulatedPlayer::with_library([("file:///short.mp3", Some(Duration::from_millis(5)))]);
        let ended = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&ended);
        player.on_transport_change(Arc::new(move |state| {
            if state == TransportState::Ended {
                *flag.lock().unwrap_or_else(PoisonError::into_inner) = true;
            }
        }));

        player.load(&locator("file:///short.mp3")).unwrap();
        player.play().unwrap();
        sleep(Duration::from_millis(15));

        let sample = player.sample().unwrap();
        assert_eq!(sample.transport, TransportState::Ended);
        assert_eq!(sample.position, Duration::from_millis(5));
        assert!(*ended.lock().unwrap_or_else(PoisonError::into_inner));
    }

    #[test]
    fn test_unknown_locator_rejected_with_library() {
        let player = SimulatedPlayer::with_library([("file:///a.mp3", None)]);
        assert!(player.load(&locator("file:///b.mp3")).is_err());
        assert!(player.load(&locator("file:///a.mp3")).is_ok());
    }

    #[test]
    fn test_seek_backwards() {
        let player = SimulatedPlayer::new();
        player.load(&locator("file:///a.mp3")).unwrap();
        player.seek(Duration::from_secs(10));
        player.seek(Duration::from_secs(2));

        assert_eq!(player.sample().unwrap().position, Duration::from_secs(2));
    }
}
