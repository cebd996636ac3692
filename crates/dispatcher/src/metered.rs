//! MeteredDispatcher - counts outcomes of a wrapped actuator

use std::sync::Arc;

use contracts::{DispatchOutcome, HapticDispatcher, HapticEvent};

use crate::metrics::DispatchMetrics;

/// Wraps an actuator and records every outcome into shared counters
///
/// A dispatch whose future is dropped before completing (the engine's tick
/// deadline passed) is counted as abandoned.
pub struct MeteredDispatcher<D> {
    inner: D,
    metrics: Arc<DispatchMetrics>,
}

impl<D: HapticDispatcher> MeteredDispatcher<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            metrics: Arc::new(DispatchMetrics::new()),
        }
    }

    /// Shared counters; stay readable after the engine takes ownership
    pub fn metrics(&self) -> Arc<DispatchMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    pub fn into_inner(self) -> D {
        self.inner
    }
}

struct AbandonGuard<'a> {
    metrics: &'a DispatchMetrics,
    armed: bool,
}

impl Drop for AbandonGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.metrics.inc_abandoned();
        }
    }
}

impl<D: HapticDispatcher> HapticDispatcher for MeteredDispatcher<D> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn is_supported(&self) -> bool {
        self.inner.is_supported()
    }

    async fn dispatch(&mut self, event: &HapticEvent) -> DispatchOutcome {
        let mut guard = AbandonGuard {
            metrics: &self.metrics,
            armed: true,
        };
        let outcome = self.inner.dispatch(event).await;
        guard.armed = false;
        self.metrics.record(outcome);
        outcome
    }
}
