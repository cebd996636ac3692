//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Manifest file not found
    #[error("Manifest file not found: {path}")]
    ManifestNotFound { path: String },

    /// Manifest has no asset to play
    #[error("Manifest has no assets")]
    NoAssets,

    /// Requested asset is not in the manifest
    #[error("Asset '{locator}' not found in manifest (available: {available})")]
    AssetNotFound { locator: String, available: String },

    /// Malformed command-line value
    #[error("Invalid --{argument}: {message}")]
    InvalidArgument { argument: String, message: String },

    /// Playback run failed
    #[error("Playback failed: {message}")]
    Playback { message: String },

    /// Manifest or engine error
    #[error(transparent)]
    Contract(#[from] contracts::ContractError),
}

impl CliError {
    pub fn manifest_not_found(path: impl Into<String>) -> Self {
        Self::ManifestNotFound { path: path.into() }
    }

    pub fn asset_not_found<'a>(
        locator: impl Into<String>,
        available: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self::AssetNotFound {
            locator: locator.into(),
            available: available.into_iter().collect::<Vec<_>>().join(", "),
        }
    }

    pub fn invalid_argument(argument: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            message: message.into(),
        }
    }

    pub fn playback(message: impl Into<String>) -> Self {
        Self::Playback {
            message: message.into(),
        }
    }
}
