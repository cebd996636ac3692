//! Cue / CueTimeline - per-page haptic cue tables
//!
//! A timeline is validated once at construction and is immutable afterwards,
//! so the engine can rely on strictly ascending timestamps when searching.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ContractError, PatternId};

/// Caller-selected page index choosing the active timeline
pub type PageNumber = u32;

/// Default actuator intensity for a cue (full strength)
pub const DEFAULT_INTENSITY: f32 = 1.0;

/// Default actuator sharpness for a cue
pub const DEFAULT_SHARPNESS: f32 = 0.6;

/// A single haptic cue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    /// Offset from the start of the asset
    pub timestamp: Duration,

    /// Pattern to play when the cue fires
    pub pattern: PatternId,

    /// Intensity in [0, 1]
    pub intensity: f32,

    /// Sharpness in [0, 1]
    pub sharpness: f32,
}

impl Cue {
    /// Cue with default intensity and sharpness
    pub fn new(timestamp: Duration, pattern: impl Into<PatternId>) -> Self {
        Self {
            timestamp,
            pattern: pattern.into(),
            intensity: DEFAULT_INTENSITY,
            sharpness: DEFAULT_SHARPNESS,
        }
    }

    /// Convenience constructor taking milliseconds
    pub fn at_ms(ms: u64, pattern: impl Into<PatternId>) -> Self {
        Self::new(Duration::from_millis(ms), pattern)
    }

    /// Override intensity and sharpness
    pub fn with_parameters(mut self, intensity: f32, sharpness: f32) -> Self {
        self.intensity = intensity;
        self.sharpness = sharpness;
        self
    }
}

/// Ordered cue table for one page
///
/// Invariant: timestamps are strictly ascending. An empty timeline is legal and
/// simply never fires.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CueTimeline {
    page: PageNumber,
    cues: Vec<Cue>,
}

impl CueTimeline {
    /// Build a timeline, rejecting unsorted or duplicate timestamps
    ///
    /// # Errors
    /// Returns [`ContractError::InvalidTimeline`] describing the first offending cue.
    pub fn new(page: PageNumber, cues: Vec<Cue>) -> Result<Self, ContractError> {
        for (idx, cue) in cues.iter().enumerate() {
            if cue.pattern.is_blank() {
                return Err(ContractError::invalid_timeline(
                    page,
                    format!("cue[{idx}] has an empty pattern id"),
                ));
            }
            check_unit_range(page, idx, "intensity", cue.intensity)?;
            check_unit_range(page, idx, "sharpness", cue.sharpness)?;
        }

        for (idx, pair) in cues.windows(2).enumerate() {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.timestamp == prev.timestamp {
                return Err(ContractError::invalid_timeline(
                    page,
                    format!(
                        "duplicate timestamp {}ms at cue[{}]",
                        next.timestamp.as_millis(),
                        idx + 1
                    ),
                ));
            }
            if next.timestamp < prev.timestamp {
                return Err(ContractError::invalid_timeline(
                    page,
                    format!(
                        "unsorted cues: cue[{}] at {}ms precedes cue[{}] at {}ms",
                        idx + 1,
                        next.timestamp.as_millis(),
                        idx,
                        prev.timestamp.as_millis()
                    ),
                ));
            }
        }

        Ok(Self { page, cues })
    }

    /// Empty timeline for a page with no cues
    pub fn empty(page: PageNumber) -> Self {
        Self {
            page,
            cues: Vec::new(),
        }
    }

    pub fn page(&self) -> PageNumber {
        self.page
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Cue> {
        self.cues.get(index)
    }

    /// Index of the first cue with `timestamp >= position`
    pub fn first_at_or_after(&self, position: Duration) -> usize {
        self.cues.partition_point(|cue| cue.timestamp < position)
    }

    /// Index of the first cue with `timestamp > position`
    pub fn first_after(&self, position: Duration) -> usize {
        self.cues.partition_point(|cue| cue.timestamp <= position)
    }

    /// Timestamp of the last cue, if any
    pub fn last_timestamp(&self) -> Option<Duration> {
        self.cues.last().map(|cue| cue.timestamp)
    }
}

fn check_unit_range(
    page: PageNumber,
    idx: usize,
    field: &str,
    value: f32,
) -> Result<(), ContractError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ContractError::invalid_timeline(
            page,
            format!("cue[{idx}].{field} must be within [0, 1], got {value}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline(page: PageNumber, cues: &[(u64, &str)]) -> Result<CueTimeline, ContractError> {
        CueTimeline::new(
            page,
            cues.iter().map(|(ms, p)| Cue::at_ms(*ms, *p)).collect(),
        )
    }

    #[test]
    fn test_sorted_timeline_accepted() {
        let tl = timeline(1, &[(1000, "tap_a"), (2500, "tap_b")]).unwrap();
        assert_eq!(tl.len(), 2);
        assert_eq!(tl.page(), 1);
        assert_eq!(tl.last_timestamp(), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn test_duplicate_timestamp_rejected() {
        let err = timeline(1, &[(1000, "tap_a"), (1000, "tap_b")]).unwrap_err();
        assert!(err.is_load_error());
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_unsorted_rejected() {
        let err = timeline(3, &[(2000, "tap_a"), (1000, "tap_b")]).unwrap_err();
        assert!(matches!(err, ContractError::InvalidTimeline { page: 3, .. }));
        assert!(err.to_string().contains("unsorted"));
    }

    #[test]
    fn test_parameter_range_rejected() {
        let cue = Cue::at_ms(10, "tap").with_parameters(1.5, 0.2);
        let err = CueTimeline::new(0, vec![cue]).unwrap_err();
        assert!(err.to_string().contains("intensity"));
    }

    #[test]
    fn test_blank_pattern_rejected() {
        assert!(timeline(0, &[(10, " ")]).is_err());
    }

    #[test]
    fn test_empty_is_valid() {
        let tl = timeline(4, &[]).unwrap();
        assert!(tl.is_empty());
        assert_eq!(tl.first_after(Duration::from_secs(10)), 0);
    }

    #[test]
    fn test_search_bounds() {
        let tl = timeline(1, &[(500, "a"), (1000, "b"), (1500, "c")]).unwrap();
        let at = Duration::from_millis(1000);
        assert_eq!(tl.first_at_or_after(at), 1);
        assert_eq!(tl.first_after(at), 2);
        assert_eq!(tl.first_at_or_after(Duration::ZERO), 0);
        assert_eq!(tl.first_after(Duration::from_millis(2000)), 3);
    }
}
