//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Actuator could not be built from its configuration
    #[error("failed to create actuator '{name}': {message}")]
    ActuatorCreation { name: String, message: String },

    #[error("actuator error: {0}")]
    Contract(#[from] contracts::ContractError),
}

impl DispatcherError {
    pub fn actuator_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ActuatorCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}
