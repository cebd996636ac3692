//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace: cue data,
//! transport and haptic collaborator traits, diagnostics and configuration.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Playback positions and cue timestamps are offsets from the start of the
//!   asset, expressed as [`std::time::Duration`]
//! - The playback clock is owned by the external media player and is treated as
//!   best-effort: it may stall, jitter or jump backwards on seek

mod asset;
mod cue;
mod diagnostics;
mod error;
mod haptic;
mod manifest;
mod pattern_id;
mod playback;
mod session;
mod sync_engine_config;

pub use asset::*;
pub use cue::*;
pub use diagnostics::*;
pub use error::*;
pub use haptic::*;
pub use manifest::*;
pub use pattern_id::PatternId;
pub use playback::*;
pub use session::*;
pub use sync_engine_config::*;
