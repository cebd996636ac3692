//! PatternId - Opaque haptic pattern identifier
//!
//! Cues reference a pattern by name; the actuator resolves it. Uses Arc<str>
//! so the id can be copied into every dispatched event without allocating.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Haptic pattern identifier.
///
/// Created once when a manifest is loaded, then cloned into a `HapticEvent`
/// each time its cue fires.
///
/// # Examples
/// ```
/// use contracts::PatternId;
///
/// let id: PatternId = "tap_a".into();
/// let id2 = id.clone();
/// assert_eq!(id, id2);
/// assert_eq!(id.as_str(), "tap_a");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatternId(Arc<str>);

impl PatternId {
    #[inline]
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Blank ids are rejected by timeline validation.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Borrow<str> for PatternId {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PatternId {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PatternId {
    #[inline]
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for PatternId {
    #[inline]
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PatternId({:?})", &*self.0)
    }
}

impl PartialEq<str> for PatternId {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for PatternId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl PartialEq<String> for PatternId {
    fn eq(&self, other: &String) -> bool {
        &*self.0 == other.as_str()
    }
}

impl Serialize for PatternId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PatternId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_clone_shares_storage() {
        let id1: PatternId = "rumble_long".into();
        let id2 = id1.clone();

        assert_eq!(id1.as_str().as_ptr(), id2.as_str().as_ptr());
    }

    #[test]
    fn test_equality_with_strings() {
        let id: PatternId = "tap_a".into();
        assert_eq!(id, "tap_a");
        assert_eq!(id, String::from("tap_a"));
        assert_ne!(id, PatternId::from("tap_b"));
    }

    #[test]
    fn test_blank_detection() {
        assert!(PatternId::from("  ").is_blank());
        assert!(!PatternId::from("tap").is_blank());
    }

    #[test]
    fn test_pattern_usage_counts() {
        let fired: Vec<PatternId> = vec!["tap_a".into(), "tap_b".into(), "tap_a".into()];
        let mut counts: HashMap<PatternId, u32> = HashMap::new();
        for id in fired {
            *counts.entry(id).or_default() += 1;
        }

        assert_eq!(counts.get("tap_a"), Some(&2));
        assert_eq!(counts.get("tap_b"), Some(&1));
    }

    #[test]
    fn test_serde_as_plain_string() {
        let id: PatternId = "tap_c".into();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"tap_c\"");

        let parsed: PatternId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}
