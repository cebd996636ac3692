//! Asset - a music asset with its per-page cue timelines
//!
//! Immutable once built; owned by the active playback session.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ContractError, CueTimeline, PageNumber};

/// Opaque URL-like source locator understood by the media player
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetLocator(Arc<str>);

impl AssetLocator {
    /// Parse a locator
    ///
    /// # Errors
    /// Empty locators or locators containing whitespace are rejected as load errors.
    pub fn parse(raw: &str) -> Result<Self, ContractError> {
        if raw.is_empty() {
            return Err(ContractError::load(raw, "asset locator is empty"));
        }
        if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ContractError::load(
                raw,
                "asset locator contains whitespace or control characters",
            ));
        }
        Ok(Self(Arc::from(raw)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Scheme prefix (`file`, `https`, `library`...), if present
    pub fn scheme(&self) -> Option<&str> {
        self.0
            .split_once(':')
            .map(|(scheme, _)| scheme)
            .filter(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '+'))
    }
}

impl fmt::Display for AssetLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AssetLocator {
    type Error = ContractError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AssetLocator> for String {
    fn from(value: AssetLocator) -> Self {
        value.0.to_string()
    }
}

/// Handle returned by the media player after a successful load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetHandle {
    pub locator: AssetLocator,
    /// Duration as reported by the player, when known
    pub duration: Option<Duration>,
}

/// Music asset plus cue tables keyed by page number
#[derive(Debug, Clone)]
pub struct Asset {
    locator: AssetLocator,
    duration: Option<Duration>,
    timelines: BTreeMap<PageNumber, CueTimeline>,
}

impl Asset {
    /// Build an asset from already-validated timelines
    ///
    /// # Errors
    /// Two timelines claiming the same page number are rejected.
    pub fn new(
        locator: AssetLocator,
        duration: Option<Duration>,
        timelines: Vec<CueTimeline>,
    ) -> Result<Self, ContractError> {
        let mut by_page = BTreeMap::new();
        for timeline in timelines {
            let page = timeline.page();
            if by_page.insert(page, timeline).is_some() {
                return Err(ContractError::invalid_timeline(
                    page,
                    "duplicate page number in asset",
                ));
            }
        }
        Ok(Self {
            locator,
            duration,
            timelines: by_page,
        })
    }

    pub fn locator(&self) -> &AssetLocator {
        &self.locator
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Timeline for a page, if the asset defines one
    pub fn timeline(&self, page: PageNumber) -> Option<&CueTimeline> {
        self.timelines.get(&page)
    }

    /// Page numbers that carry a timeline, ascending
    pub fn pages(&self) -> impl Iterator<Item = PageNumber> + '_ {
        self.timelines.keys().copied()
    }

    pub fn timelines(&self) -> impl Iterator<Item = &CueTimeline> {
        self.timelines.values()
    }

    /// Total number of cues over all pages
    pub fn cue_count(&self) -> usize {
        self.timelines.values().map(CueTimeline::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cue;

    #[test]
    fn test_locator_parse() {
        let loc = AssetLocator::parse("library://songs/intro.m4a").unwrap();
        assert_eq!(loc.scheme(), Some("library"));
        assert_eq!(loc.to_string(), "library://songs/intro.m4a");

        assert!(AssetLocator::parse("").unwrap_err().is_load_error());
        assert!(AssetLocator::parse("file:///with space.mp3").is_err());
        assert_eq!(AssetLocator::parse("plain-name").unwrap().scheme(), None);
    }

    #[test]
    fn test_locator_serde() {
        let loc: AssetLocator = serde_json::from_str("\"file:///a.mp3\"").unwrap();
        assert_eq!(loc.as_str(), "file:///a.mp3");
        assert!(serde_json::from_str::<AssetLocator>("\"\"").is_err());
    }

    #[test]
    fn test_asset_pages() {
        let p1 = CueTimeline::new(1, vec![Cue::at_ms(1000, "tap_a")]).unwrap();
        let p2 = CueTimeline::new(2, vec![Cue::at_ms(500, "tap_c")]).unwrap();
        let asset = Asset::new(
            AssetLocator::parse("file:///x.mp3").unwrap(),
            Some(Duration::from_secs(30)),
            vec![p2, p1],
        )
        .unwrap();

        assert_eq!(asset.pages().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(asset.cue_count(), 2);
        assert!(asset.timeline(3).is_none());
    }

    #[test]
    fn test_duplicate_page_rejected() {
        let err = Asset::new(
            AssetLocator::parse("file:///x.mp3").unwrap(),
            None,
            vec![CueTimeline::empty(1), CueTimeline::empty(1)],
        )
        .unwrap_err();
        assert!(err.is_load_error());
    }
}
