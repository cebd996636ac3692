//! RecordingActuator - keeps every delivered event in memory

use std::sync::{Arc, Mutex, MutexGuard};

use contracts::{DispatchOutcome, HapticDispatcher, HapticEvent, PatternId};

/// Shared, cloneable view of recorded events
///
/// The engine owns the actuator; tests and reports read through this handle.
#[derive(Debug, Clone, Default)]
pub struct RecordedEvents {
    events: Arc<Mutex<Vec<HapticEvent>>>,
}

impl RecordedEvents {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<HapticEvent>> {
        // a poisoned log is still a valid log
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn push(&self, event: HapticEvent) {
        self.lock().push(event);
    }

    pub fn snapshot(&self) -> Vec<HapticEvent> {
        self.lock().clone()
    }

    /// Fired patterns in order
    pub fn patterns(&self) -> Vec<PatternId> {
        self.lock().iter().map(|e| e.pattern.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

/// Actuator that records events (CLI reports, integration tests)
pub struct RecordingActuator {
    name: String,
    events: RecordedEvents,
}

impl RecordingActuator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            events: RecordedEvents::new(),
        }
    }

    pub fn events(&self) -> RecordedEvents {
        self.events.clone()
    }
}

impl HapticDispatcher for RecordingActuator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn dispatch(&mut self, event: &HapticEvent) -> DispatchOutcome {
        self.events.push(event.clone());
        DispatchOutcome::Delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Cue;
    use std::time::Duration;

    #[tokio::test]
    async fn test_recording_keeps_order() {
        let mut actuator = RecordingActuator::new("rec");
        let events = actuator.events();

        for (at, pattern) in [(100, "a"), (200, "b")] {
            let event = HapticEvent::from_cue(&Cue::at_ms(at, pattern), 0, Duration::from_millis(at));
            actuator.dispatch(&event).await;
        }

        assert_eq!(events.patterns(), vec![PatternId::from("a"), PatternId::from("b")]);
        events.clear();
        assert!(events.is_empty());
    }
}
