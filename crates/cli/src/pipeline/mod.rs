//! Playback orchestration module.

mod orchestrator;
mod stats;
mod tracker;

pub use orchestrator::{select_asset, Playback, PlaybackConfig};
pub use stats::{PlaybackStats, StopReason};
