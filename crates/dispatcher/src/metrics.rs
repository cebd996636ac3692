//! Per-actuator dispatch counters

use std::sync::atomic::{AtomicU64, Ordering};

use contracts::DispatchOutcome;

/// Counters for a single actuator
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    delivered: AtomicU64,
    busy: AtomicU64,
    unsupported: AtomicU64,
    /// Dispatches abandoned because the tick deadline passed mid-call
    abandoned: AtomicU64,
}

impl DispatchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one finished dispatch
    pub fn record(&self, outcome: DispatchOutcome) {
        let counter = match outcome {
            DispatchOutcome::Delivered => &self.delivered,
            DispatchOutcome::Busy => &self.busy,
            DispatchOutcome::Unsupported => &self.unsupported,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_abandoned(&self) {
        self.abandoned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn busy(&self) -> u64 {
        self.busy.load(Ordering::Relaxed)
    }

    pub fn unsupported(&self) -> u64 {
        self.unsupported.load(Ordering::Relaxed)
    }

    pub fn abandoned(&self) -> u64 {
        self.abandoned.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            delivered: self.delivered(),
            busy: self.busy(),
            unsupported: self.unsupported(),
            abandoned: self.abandoned(),
        }
    }
}

/// Snapshot of dispatch counters (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub delivered: u64,
    pub busy: u64,
    pub unsupported: u64,
    pub abandoned: u64,
}

impl MetricsSnapshot {
    /// Every dispatch that was started
    pub fn attempted(&self) -> u64 {
        self.delivered + self.busy + self.unsupported + self.abandoned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_outcomes() {
        let metrics = DispatchMetrics::new();
        metrics.record(DispatchOutcome::Delivered);
        metrics.record(DispatchOutcome::Delivered);
        metrics.record(DispatchOutcome::Busy);
        metrics.inc_abandoned();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.delivered, 2);
        assert_eq!(snapshot.busy, 1);
        assert_eq!(snapshot.unsupported, 0);
        assert_eq!(snapshot.attempted(), 4);
    }
}
