//! LogActuator - logs each haptic event via tracing

use contracts::{DispatchOutcome, HapticDispatcher, HapticEvent};
use tracing::{info, instrument};

/// Actuator that logs events instead of driving hardware (headless hosts, debugging)
pub struct LogActuator {
    name: String,
    fired: u64,
}

impl LogActuator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fired: 0,
        }
    }

    /// Events logged so far
    pub fn fired(&self) -> u64 {
        self.fired
    }
}

impl HapticDispatcher for LogActuator {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_actuator_dispatch",
        skip(self, event),
        fields(actuator = %self.name, pattern = %event.pattern)
    )]
    async fn dispatch(&mut self, event: &HapticEvent) -> DispatchOutcome {
        self.fired += 1;
        info!(
            actuator = %self.name,
            page = event.page,
            cue_ms = event.cue_timestamp.as_millis() as u64,
            position_ms = event.fired_at_position.as_millis() as u64,
            lateness_ms = event.lateness().as_millis() as u64,
            intensity = event.intensity,
            sharpness = event.sharpness,
            "haptic pattern fired"
        );
        DispatchOutcome::Delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Cue;
    use std::time::Duration;

    #[tokio::test]
    async fn test_log_actuator_dispatch() {
        let mut actuator = LogActuator::new("test_log");
        let event = HapticEvent::from_cue(&Cue::at_ms(1000, "tap"), 1, Duration::from_millis(1016));

        assert_eq!(actuator.dispatch(&event).await, DispatchOutcome::Delivered);
        assert_eq!(actuator.fired(), 1);
        assert!(actuator.is_supported());
    }

    #[tokio::test]
    async fn test_log_actuator_name() {
        let actuator = LogActuator::new("my_logger");
        assert_eq!(actuator.name(), "my_logger");
    }
}
