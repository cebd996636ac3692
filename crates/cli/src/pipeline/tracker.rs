//! Feeds delivered cues into the run's diagnostics aggregator.

use std::sync::{Arc, Mutex, PoisonError};

use contracts::{DispatchOutcome, HapticDispatcher, HapticEvent};
use observability::DiagnosticsAggregator;

/// Shared aggregator for one playback run
pub type SharedAggregator = Arc<Mutex<DiagnosticsAggregator>>;

pub fn lock_aggregator(
    aggregator: &SharedAggregator,
) -> std::sync::MutexGuard<'_, DiagnosticsAggregator> {
    aggregator.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Actuator wrapper recording the lateness of every delivered cue
pub struct FiredTracker<D> {
    inner: D,
    aggregator: SharedAggregator,
}

impl<D: HapticDispatcher> FiredTracker<D> {
    pub fn new(inner: D, aggregator: SharedAggregator) -> Self {
        Self { inner, aggregator }
    }
}

impl<D: HapticDispatcher> HapticDispatcher for FiredTracker<D> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn is_supported(&self) -> bool {
        self.inner.is_supported()
    }

    async fn dispatch(&mut self, event: &HapticEvent) -> DispatchOutcome {
        let outcome = self.inner.dispatch(event).await;
        if outcome == DispatchOutcome::Delivered {
            let lateness_ms = event.lateness().as_secs_f64() * 1000.0;
            lock_aggregator(&self.aggregator).record_fired(lateness_ms);
        }
        outcome
    }
}
