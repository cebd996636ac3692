//! Diagnostic - out-of-band runtime fault reports
//!
//! Per-tick faults never fail an engine call. They are published on the
//! diagnostics stream instead, so a haptic miss never stops the music.

use std::fmt;
use std::time::Duration;

use crate::{PatternId, TransportState};

/// Why a due cue was not delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// Actuator reported busy
    Busy,
    /// Cue was older than the late-cue tolerance when it became due
    Late,
    /// Actuator has no haptic capability
    Unsupported,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Busy => "busy",
            Self::Late => "late",
            Self::Unsupported => "unsupported",
        };
        f.write_str(name)
    }
}

/// Runtime diagnostic emitted by the sync engine
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A due cue was dropped
    CueDropped {
        pattern: PatternId,
        position: Duration,
        reason: DropReason,
    },

    /// Dispatch deadline passed; the tick's remaining cues were dropped
    DispatchTimeout { dropped: usize, position: Duration },

    /// Actuator lacks haptic capability (reported once per session)
    CapabilityUnsupported { actuator: String },

    /// Playback clock read failed (transient)
    ClockReadFailed { consecutive: u32, message: String },

    /// Clock reads have failed `consecutive_failures` times in a row
    StalledPlayback { consecutive_failures: u32 },

    /// Position moved backwards beyond the jitter tolerance; cue pointer re-synchronised
    SeekDetected { from: Duration, to: Duration },

    /// Transport ended or was paused externally; session moved to `Stopped`
    PlaybackHalted {
        transport: TransportState,
        position: Option<Duration>,
    },
}

impl Diagnostic {
    /// Short stable name, used as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CueDropped { .. } => "cue_dropped",
            Self::DispatchTimeout { .. } => "dispatch_timeout",
            Self::CapabilityUnsupported { .. } => "capability_unsupported",
            Self::ClockReadFailed { .. } => "clock_read_failed",
            Self::StalledPlayback { .. } => "stalled_playback",
            Self::SeekDetected { .. } => "seek_detected",
            Self::PlaybackHalted { .. } => "playback_halted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels() {
        let d = Diagnostic::StalledPlayback {
            consecutive_failures: 3,
        };
        assert_eq!(d.kind(), "stalled_playback");

        let d = Diagnostic::CueDropped {
            pattern: "tap".into(),
            position: Duration::ZERO,
            reason: DropReason::Busy,
        };
        assert_eq!(d.kind(), "cue_dropped");
        assert_eq!(DropReason::Late.to_string(), "late");
    }
}
