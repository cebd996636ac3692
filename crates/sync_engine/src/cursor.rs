//! Cue cursor - the cue-matching algorithm.
//!
//! Fires every cue whose timestamp falls in `(last_position, position]`,
//! ascending, exactly once. The cursor only moves forward while the clock
//! does; a backwards jump re-synchronises it by binary search.

use std::ops::Range;
use std::time::Duration;

use contracts::CueTimeline;

/// What a new clock reading means for the cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Cues at these indices are due, ascending (possibly empty)
    Due(Range<usize>),
    /// Clock moved backwards beyond the jitter tolerance
    Rewound { from: Duration, to: Duration },
    /// Clock moved backwards within the jitter tolerance; position is held
    Held,
}

/// Cursor over the active timeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CueCursor {
    /// Lowest index not yet fired
    next: usize,
    /// Last position the cursor committed to
    last_position: Duration,
}

impl CueCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> usize {
        self.next
    }

    pub fn last_position(&self) -> Duration {
        self.last_position
    }

    /// Back to the start: pointer 0, position 0
    pub fn clear(&mut self) {
        self.next = 0;
        self.last_position = Duration::ZERO;
    }

    /// Point at the first cue of `timeline` at or after the last known
    /// position, so a page swap neither re-fires past cues nor skips one due now.
    pub fn resync_for_page(&mut self, timeline: &CueTimeline) {
        self.next = timeline.first_at_or_after(self.last_position);
    }

    /// Work out what `position` means without changing the cursor
    pub fn plan(
        &self,
        timeline: &CueTimeline,
        position: Duration,
        regression_tolerance: Duration,
    ) -> Advance {
        if position < self.last_position {
            let regression = self.last_position - position;
            if regression <= regression_tolerance {
                return Advance::Held;
            }
            return Advance::Rewound {
                from: self.last_position,
                to: position,
            };
        }

        let cues = timeline.cues();
        let start = self.next.min(cues.len());
        let mut end = start;
        while end < cues.len() && cues[end].timestamp <= position {
            end += 1;
        }
        Advance::Due(start..end)
    }

    /// Apply a plan once its cues have been handled
    pub fn commit(&mut self, timeline: &CueTimeline, advance: &Advance, position: Duration) {
        match advance {
            Advance::Due(range) => {
                self.next = range.end;
                self.last_position = position;
            }
            Advance::Rewound { to, .. } => {
                self.next = timeline.first_after(*to);
                self.last_position = *to;
            }
            Advance::Held => {}
        }
    }
}
