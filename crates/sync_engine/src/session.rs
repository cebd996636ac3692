//! PlaybackSession - one loaded asset and its cue progress

use std::sync::Arc;
use std::time::Duration;

use contracts::{Asset, AssetHandle, AssetLocator, Cue, CueTimeline, PageNumber, SyncEngineConfig};

use crate::cursor::{Advance, CueCursor};

/// Cues one tick has to handle, computed before any dispatch
#[derive(Debug, Clone)]
pub struct TickPlan {
    pub position: Duration,
    pub advance: Advance,
    /// Due cues to dispatch, ascending
    pub due: Vec<Cue>,
    /// Due cues already older than the late-cue tolerance
    pub late: Vec<Cue>,
}

/// Session state replaced wholesale on every `load`
#[derive(Debug)]
pub struct PlaybackSession {
    asset: Arc<Asset>,
    handle: AssetHandle,
    /// Timeline of the selected page (empty if the asset has none)
    active: CueTimeline,
    cursor: CueCursor,
    /// Progress at the last committed tick before a transport halt
    resume_point: Option<CueCursor>,
    clock_failures: u32,
    /// `CapabilityUnsupported` already reported for this session
    unsupported: bool,
}

impl PlaybackSession {
    pub fn new(asset: Arc<Asset>, handle: AssetHandle, page: PageNumber) -> Self {
        let active = timeline_for(&asset, page);
        Self {
            asset,
            handle,
            active,
            cursor: CueCursor::new(),
            resume_point: None,
            clock_failures: 0,
            unsupported: false,
        }
    }

    pub fn asset(&self) -> &Arc<Asset> {
        &self.asset
    }

    pub fn handle(&self) -> &AssetHandle {
        &self.handle
    }

    pub fn locator(&self) -> &AssetLocator {
        self.asset.locator()
    }

    pub fn active_timeline(&self) -> &CueTimeline {
        &self.active
    }

    pub fn cursor(&self) -> &CueCursor {
        &self.cursor
    }

    /// Swap the active timeline and point at the first cue at or after the
    /// last known position
    pub fn select_page(&mut self, page: PageNumber) {
        self.active = timeline_for(&self.asset, page);
        self.cursor.resync_for_page(&self.active);
        if let Some(point) = self.resume_point.as_mut() {
            point.resync_for_page(&self.active);
        }
    }

    pub fn resume_point(&self) -> Option<&CueCursor> {
        self.resume_point.as_ref()
    }

    /// Transport halted: clear the cursor but keep the committed progress so
    /// the next `start` continues where matching left off
    pub fn suspend(&mut self) {
        self.resume_point = Some(self.cursor);
        self.cursor.clear();
        self.clock_failures = 0;
    }

    /// Restore the progress kept by `suspend`, if any
    pub fn resume(&mut self) -> bool {
        match self.resume_point.take() {
            Some(point) => {
                self.cursor = point;
                true
            }
            None => false,
        }
    }

    /// Clear pointer, position, resume point and the clock failure streak
    pub fn rewind(&mut self) {
        self.cursor.clear();
        self.resume_point = None;
        self.clock_failures = 0;
    }

    /// Returns the length of the current failure streak
    pub fn record_clock_failure(&mut self) -> u32 {
        self.clock_failures = self.clock_failures.saturating_add(1);
        self.clock_failures
    }

    /// Returns the length of the streak that just ended
    pub fn record_clock_success(&mut self) -> u32 {
        std::mem::take(&mut self.clock_failures)
    }

    pub fn is_unsupported(&self) -> bool {
        self.unsupported
    }

    /// Mark the actuator unsupported; true only the first time
    pub fn mark_unsupported(&mut self) -> bool {
        !std::mem::replace(&mut self.unsupported, true)
    }

    pub fn plan(&self, position: Duration, config: &SyncEngineConfig) -> TickPlan {
        let advance = self
            .cursor
            .plan(&self.active, position, config.regression_tolerance());

        let mut due = Vec::new();
        let mut late = Vec::new();
        if let Advance::Due(range) = &advance {
            let tolerance = config.late_cue_tolerance();
            for cue in &self.active.cues()[range.clone()] {
                match tolerance {
                    Some(tol) if position.saturating_sub(cue.timestamp) > tol => {
                        late.push(cue.clone())
                    }
                    _ => due.push(cue.clone()),
                }
            }
        }

        TickPlan {
            position,
            advance,
            due,
            late,
        }
    }

    pub fn commit(&mut self, plan: &TickPlan) {
        self.cursor.commit(&self.active, &plan.advance, plan.position);
    }
}

fn timeline_for(asset: &Asset, page: PageNumber) -> CueTimeline {
    asset
        .timeline(page)
        .cloned()
        .unwrap_or_else(|| CueTimeline::empty(page))
}
