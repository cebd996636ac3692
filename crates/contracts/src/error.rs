//! Layered error definitions
//!
//! Categorized by source: config / load / state / clock / transport

use thiserror::Error;

use crate::{PageNumber, PlayerState};

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Load Errors =====
    /// Asset could not be loaded (bad locator, player refused it)
    #[error("load error for '{locator}': {message}")]
    Load { locator: String, message: String },

    /// Cue timeline failed validation (unsorted, duplicate timestamps, bad parameters)
    #[error("invalid cue timeline for page {page}: {message}")]
    InvalidTimeline { page: PageNumber, message: String },

    // ===== State Errors =====
    /// Operation not permitted in the current player state
    #[error("cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: PlayerState,
    },

    // ===== Collaborator Errors =====
    /// Playback position could not be read (transient)
    #[error("clock read error: {message}")]
    ClockRead { message: String },

    /// Transport control command failed
    #[error("transport error: {message}")]
    Transport { message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create asset load error
    pub fn load(locator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Load {
            locator: locator.into(),
            message: message.into(),
        }
    }

    /// Create cue timeline validation error
    pub fn invalid_timeline(page: PageNumber, message: impl Into<String>) -> Self {
        Self::InvalidTimeline {
            page,
            message: message.into(),
        }
    }

    /// Create invalid state error
    pub fn invalid_state(operation: &'static str, state: PlayerState) -> Self {
        Self::InvalidState { operation, state }
    }

    /// Create clock read error
    pub fn clock_read(message: impl Into<String>) -> Self {
        Self::ClockRead {
            message: message.into(),
        }
    }

    /// Create transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Whether this error belongs to the load taxonomy (asset or timeline rejected)
    pub fn is_load_error(&self) -> bool {
        matches!(self, Self::Load { .. } | Self::InvalidTimeline { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_classification() {
        assert!(ContractError::load("file:///a.m4a", "missing").is_load_error());
        assert!(ContractError::invalid_timeline(1, "duplicate").is_load_error());
        assert!(!ContractError::invalid_state("start", PlayerState::Idle).is_load_error());
    }

    #[test]
    fn test_invalid_state_message() {
        let err = ContractError::invalid_state("start", PlayerState::Playing);
        assert_eq!(err.to_string(), "cannot start while playing");
    }
}
