//! Actuator implementations
//!
//! Contains LogActuator, RecordingActuator, and MockActuator.

mod log;
mod mock;
mod recording;

pub use self::log::LogActuator;
pub use self::mock::MockActuator;
pub use self::recording::{RecordedEvents, RecordingActuator};
