//! Actuator selection from configuration

use contracts::{ActuatorConfig, ActuatorKind, DispatchOutcome, HapticDispatcher, HapticEvent};
use tracing::{info, instrument};

use crate::actuators::{LogActuator, RecordedEvents, RecordingActuator};
use crate::error::DispatcherError;

/// Any actuator the manifest can name
pub enum Actuator {
    Log(LogActuator),
    Recording(RecordingActuator),
}

impl Actuator {
    /// Recorded events, for the recording actuator only
    pub fn recorded_events(&self) -> Option<RecordedEvents> {
        match self {
            Self::Recording(actuator) => Some(actuator.events()),
            Self::Log(_) => None,
        }
    }
}

impl HapticDispatcher for Actuator {
    fn name(&self) -> &str {
        match self {
            Self::Log(actuator) => actuator.name(),
            Self::Recording(actuator) => actuator.name(),
        }
    }

    fn is_supported(&self) -> bool {
        match self {
            Self::Log(actuator) => actuator.is_supported(),
            Self::Recording(actuator) => actuator.is_supported(),
        }
    }

    async fn dispatch(&mut self, event: &HapticEvent) -> DispatchOutcome {
        match self {
            Self::Log(actuator) => actuator.dispatch(event).await,
            Self::Recording(actuator) => actuator.dispatch(event).await,
        }
    }
}

/// Create an actuator from configuration
#[instrument(
    name = "dispatcher_create_actuator",
    skip(config),
    fields(actuator = %config.name, kind = ?config.kind)
)]
pub fn create_actuator(config: &ActuatorConfig) -> Result<Actuator, DispatcherError> {
    let name = config.name.trim();
    if name.is_empty() {
        return Err(DispatcherError::actuator_creation(
            &config.name,
            "actuator name must not be empty",
        ));
    }

    let actuator = match config.kind {
        ActuatorKind::Log => Actuator::Log(LogActuator::new(name)),
        ActuatorKind::Recording => Actuator::Recording(RecordingActuator::new(name)),
    };
    info!(actuator = name, "actuator created");
    Ok(actuator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Cue;
    use std::time::Duration;

    #[tokio::test]
    async fn test_create_recording_actuator() {
        let config = ActuatorConfig {
            name: "rec".to_string(),
            kind: ActuatorKind::Recording,
        };
        let mut actuator = create_actuator(&config).unwrap();
        let events = actuator.recorded_events().unwrap();

        let event = HapticEvent::from_cue(&Cue::at_ms(10, "tap"), 0, Duration::from_millis(10));
        assert_eq!(actuator.dispatch(&event).await, DispatchOutcome::Delivered);
        assert_eq!(events.len(), 1);
        assert_eq!(actuator.name(), "rec");
    }

    #[test]
    fn test_create_log_actuator() {
        let actuator = create_actuator(&ActuatorConfig::default()).unwrap();
        assert!(matches!(actuator, Actuator::Log(_)));
        assert!(actuator.recorded_events().is_none());
    }

    #[test]
    fn test_blank_name_rejected() {
        let config = ActuatorConfig {
            name: "  ".to_string(),
            kind: ActuatorKind::Log,
        };
        assert!(matches!(
            create_actuator(&config),
            Err(DispatcherError::ActuatorCreation { .. })
        ));
    }
}
