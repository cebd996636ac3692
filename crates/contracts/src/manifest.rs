//! HapticManifest - Config Loader output
//!
//! Describes the bundled cue tables for one or more assets, the engine tuning
//! and which actuator adapter to drive.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    Asset, AssetLocator, ContractError, Cue, CueTimeline, PageNumber, PatternId,
    SyncEngineConfig, DEFAULT_INTENSITY, DEFAULT_SHARPNESS,
};

/// Manifest format version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ManifestVersion {
    #[default]
    V1,
}

/// Complete manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HapticManifest {
    #[serde(default)]
    pub version: ManifestVersion,

    /// Engine tuning
    #[serde(default)]
    pub engine: SyncEngineConfig,

    /// Actuator selection
    #[serde(default)]
    pub actuator: ActuatorConfig,

    /// Assets with their cue tables
    #[serde(default)]
    pub assets: Vec<AssetManifest>,
}

impl HapticManifest {
    /// Find an asset entry by locator
    pub fn find_asset(&self, locator: &str) -> Option<&AssetManifest> {
        self.assets.iter().find(|a| a.locator == locator)
    }
}

/// Actuator adapter kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuatorKind {
    /// Logs every event through tracing
    #[default]
    Log,
    /// Keeps every event in memory
    Recording,
}

/// Actuator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActuatorConfig {
    /// Name used in logs and metrics
    #[serde(default = "default_actuator_name")]
    pub name: String,

    #[serde(default)]
    pub kind: ActuatorKind,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            name: default_actuator_name(),
            kind: ActuatorKind::default(),
        }
    }
}

fn default_actuator_name() -> String {
    "haptics".to_string()
}

/// Asset entry in the manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetManifest {
    /// Source locator (URL-like)
    pub locator: String,

    /// Known duration in milliseconds (optional)
    #[serde(default)]
    pub duration_ms: Option<u64>,

    /// Per-page cue tables
    #[serde(default)]
    pub pages: Vec<PageManifest>,
}

impl AssetManifest {
    /// Validate the entry and build the runtime [`Asset`]
    ///
    /// # Errors
    /// Load errors for a bad locator, unsorted/duplicate cues, out-of-range
    /// parameters or duplicate page numbers.
    pub fn to_asset(&self) -> Result<Asset, ContractError> {
        let locator = AssetLocator::parse(&self.locator)?;
        let timelines = self
            .pages
            .iter()
            .map(PageManifest::to_timeline)
            .collect::<Result<Vec<_>, _>>()?;
        Asset::new(
            locator,
            self.duration_ms.map(Duration::from_millis),
            timelines,
        )
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration_ms.map(Duration::from_millis)
    }
}

/// One page of cues
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageManifest {
    pub number: PageNumber,

    #[serde(default)]
    pub cues: Vec<CueManifest>,
}

impl PageManifest {
    pub fn to_timeline(&self) -> Result<CueTimeline, ContractError> {
        CueTimeline::new(
            self.number,
            self.cues.iter().map(CueManifest::to_cue).collect(),
        )
    }
}

/// One cue entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CueManifest {
    /// Timestamp in milliseconds from the start of the asset
    pub at_ms: u64,

    pub pattern: PatternId,

    #[serde(default)]
    pub intensity: Option<f32>,

    #[serde(default)]
    pub sharpness: Option<f32>,
}

impl CueManifest {
    pub fn to_cue(&self) -> Cue {
        Cue::at_ms(self.at_ms, self.pattern.clone()).with_parameters(
            self.intensity.unwrap_or(DEFAULT_INTENSITY),
            self.sharpness.unwrap_or(DEFAULT_SHARPNESS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cue(at_ms: u64, pattern: &str) -> CueManifest {
        CueManifest {
            at_ms,
            pattern: pattern.into(),
            intensity: None,
            sharpness: None,
        }
    }

    #[test]
    fn test_to_asset() {
        let entry = AssetManifest {
            locator: "file:///song.m4a".to_string(),
            duration_ms: Some(180_000),
            pages: vec![PageManifest {
                number: 1,
                cues: vec![cue(1000, "tap_a"), cue(2500, "tap_b")],
            }],
        };

        let asset = entry.to_asset().unwrap();
        assert_eq!(asset.locator().as_str(), "file:///song.m4a");
        assert_eq!(asset.duration(), Some(Duration::from_secs(180)));
        let timeline = asset.timeline(1).unwrap();
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline.cues()[0].intensity, DEFAULT_INTENSITY);
        assert_eq!(timeline.cues()[0].sharpness, DEFAULT_SHARPNESS);
    }

    #[test]
    fn test_duplicate_cue_is_load_error() {
        let entry = AssetManifest {
            locator: "file:///song.m4a".to_string(),
            duration_ms: None,
            pages: vec![PageManifest {
                number: 1,
                cues: vec![cue(1000, "tap_a"), cue(1000, "tap_b")],
            }],
        };
        assert!(entry.to_asset().unwrap_err().is_load_error());
    }

    #[test]
    fn test_manifest_defaults() {
        let manifest: HapticManifest = serde_json::from_str("{}").unwrap();
        assert_eq!(manifest.version, ManifestVersion::V1);
        assert_eq!(manifest.actuator.kind, ActuatorKind::Log);
        assert_eq!(manifest.actuator.name, "haptics");
        assert!(manifest.assets.is_empty());
    }
}
