//! Sync engine configuration contracts that can be shared across crates.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::PageNumber;

/// Sync engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SyncEngineConfig {
    /// Poll loop period in milliseconds (lower = tighter sync, more wakeups; 16-33 recommended)
    #[validate(range(min = 1, max = 1000))]
    pub poll_interval_ms: u64,

    /// Per-tick budget for actuator calls in milliseconds
    #[validate(range(min = 1, max = 1000))]
    pub dispatch_timeout_ms: u64,

    /// Consecutive clock read failures before `StalledPlayback` is reported
    #[validate(range(min = 1))]
    pub stall_threshold: u32,

    /// Skip cues that are already older than this when they become due
    pub late_cue_tolerance_ms: Option<u64>,

    /// Backwards clock movement up to this size is treated as jitter
    pub regression_tolerance_ms: u64,

    /// Per-subscriber diagnostics backlog; a subscriber further behind loses the oldest
    #[validate(range(min = 1))]
    pub diagnostics_capacity: usize,

    /// Page selected when the engine is created
    pub initial_page: PageNumber,
}

impl Default for SyncEngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 16,
            dispatch_timeout_ms: 8,
            stall_threshold: 3,
            late_cue_tolerance_ms: None,
            regression_tolerance_ms: 0,
            diagnostics_capacity: 256,
            initial_page: 0,
        }
    }
}

impl SyncEngineConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_millis(self.dispatch_timeout_ms.max(1))
    }

    pub fn late_cue_tolerance(&self) -> Option<Duration> {
        self.late_cue_tolerance_ms.map(Duration::from_millis)
    }

    pub fn regression_tolerance(&self) -> Duration {
        Duration::from_millis(self.regression_tolerance_ms)
    }
}
