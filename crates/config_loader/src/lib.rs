//! # Config Loader
//!
//! Haptic manifest loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON manifests
//! - Validate engine tuning, actuator selection and every cue table
//! - Build runtime [`Asset`]s for the sync engine
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let manifest = ConfigLoader::load_from_path(Path::new("haptics.toml")).unwrap();
//! println!("assets: {}", manifest.assets.len());
//! ```

mod parser;
mod validator;

pub use contracts::HapticManifest;
pub use parser::ConfigFormat;

use contracts::{Asset, ContractError};
use std::path::Path;

/// Manifest loader
///
/// Provides static methods to load manifests from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a manifest from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<HapticManifest, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load a manifest from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<HapticManifest, ContractError> {
        let manifest = parser::parse(content, format)?;
        validator::validate(&manifest)?;
        Ok(manifest)
    }

    /// Serialize a manifest to TOML string
    pub fn to_toml(manifest: &HapticManifest) -> Result<String, ContractError> {
        toml::to_string_pretty(manifest)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize a manifest to JSON string
    pub fn to_json(manifest: &HapticManifest) -> Result<String, ContractError> {
        serde_json::to_string_pretty(manifest)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }

    /// Build every asset of a manifest, in manifest order
    pub fn build_assets(manifest: &HapticManifest) -> Result<Vec<Asset>, ContractError> {
        manifest.assets.iter().map(|a| a.to_asset()).collect()
    }

    /// Build the asset registered under `locator`
    ///
    /// # Errors
    /// Load error when the manifest has no such asset.
    pub fn asset(manifest: &HapticManifest, locator: &str) -> Result<Asset, ContractError> {
        manifest
            .find_asset(locator)
            .ok_or_else(|| ContractError::load(locator, "asset not found in manifest"))?
            .to_asset()
    }
}

impl ConfigLoader {
    /// Infer manifest format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported manifest format: .{ext}"))
        })
    }

    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }
}
