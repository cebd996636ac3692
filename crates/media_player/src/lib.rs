//! # Media Player
//!
//! Media player adapters implementing the `PlaybackClock` and `TransportControl`
//! contracts.
//!
//! - [`ManualPlayer`]: deterministic player driven by the caller (tests)
//! - [`SimulatedPlayer`]: wall-clock player with known asset durations (CLI, demos)

mod manual;
mod simulated;

pub use contracts::{ClockSample, MediaPlayer, PlaybackClock, TransportControl, TransportState};
pub use manual::{ManualPlayer, TransportCommand};
pub use simulated::SimulatedPlayer;
