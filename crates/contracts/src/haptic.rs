//! HapticDispatcher trait - actuator output interface

use std::time::Duration;

use crate::{Cue, PageNumber, PatternId};

/// Event handed to the actuator when a cue fires; not retained by the engine
#[derive(Debug, Clone, PartialEq)]
pub struct HapticEvent {
    pub pattern: PatternId,

    /// Playback position observed on the tick that fired the cue
    pub fired_at_position: Duration,

    /// The cue's own timestamp (`fired_at_position - cue_timestamp` is the lateness)
    pub cue_timestamp: Duration,

    /// Page the cue belongs to
    pub page: PageNumber,

    pub intensity: f32,
    pub sharpness: f32,
}

impl HapticEvent {
    /// Build the event for a cue fired at `position`
    pub fn from_cue(cue: &Cue, page: PageNumber, position: Duration) -> Self {
        Self {
            pattern: cue.pattern.clone(),
            fired_at_position: position,
            cue_timestamp: cue.timestamp,
            page,
            intensity: cue.intensity,
            sharpness: cue.sharpness,
        }
    }

    /// How far behind its timestamp the cue fired
    pub fn lateness(&self) -> Duration {
        self.fired_at_position.saturating_sub(self.cue_timestamp)
    }
}

/// Result of a single dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Actuator accepted the pattern
    Delivered,
    /// Actuator is momentarily busy; the event is dropped, never retried
    Busy,
    /// Device has no haptic capability; permanent
    Unsupported,
}

/// Haptic actuator trait
///
/// All actuator adapters implement this trait.
#[trait_variant::make(HapticDispatcher: Send)]
pub trait LocalHapticDispatcher {
    /// Actuator name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Capability check consulted when an asset is loaded
    fn is_supported(&self) -> bool {
        true
    }

    /// Deliver one pattern to the actuator
    ///
    /// Should complete quickly; the engine bounds each tick's dispatches with
    /// a deadline and abandons the remainder once it passes.
    async fn dispatch(&mut self, event: &HapticEvent) -> DispatchOutcome;
}
