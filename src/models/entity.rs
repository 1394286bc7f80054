//! Entity codes and unordered contact pairs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a geographic or political entity in the spot registry.
///
/// Codes are assigned by the external registry; this crate never invents
/// them. Any integer is a valid code, known or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityCode(i64);

impl EntityCode {
    /// Creates an entity code.
    #[must_use]
    pub const fn new(code: i64) -> Self {
        Self(code)
    }

    /// Returns the raw integer code.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for EntityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for EntityCode {
    fn from(code: i64) -> Self {
        Self(code)
    }
}

/// Unordered pair of distinct entity codes.
///
/// The pair is stored in canonical `(min, max)` order so that `(a, b)` and
/// `(b, a)` hash and compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContactPair(EntityCode, EntityCode);

impl ContactPair {
    /// Builds the canonical pair for two codes.
    ///
    /// Returns `None` for a self-pair.
    #[must_use]
    pub fn new(a: EntityCode, b: EntityCode) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self(a, b)),
            std::cmp::Ordering::Greater => Some(Self(b, a)),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// The smaller code of the pair.
    #[must_use]
    pub const fn low(&self) -> EntityCode {
        self.0
    }

    /// The larger code of the pair.
    #[must_use]
    pub const fn high(&self) -> EntityCode {
        self.1
    }
}

impl fmt::Display for ContactPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {}}}", self.0, self.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_is_order_independent() {
        let a = EntityCode::new(223);
        let b = EntityCode::new(150);

        assert_eq!(ContactPair::new(a, b), ContactPair::new(b, a));
    }

    #[test]
    fn test_pair_is_canonical() {
        let pair = ContactPair::new(EntityCode::new(291), EntityCode::new(223)).unwrap();

        assert_eq!(pair.low(), EntityCode::new(223));
        assert_eq!(pair.high(), EntityCode::new(291));
        assert_eq!(pair.to_string(), "{223, 291}");
    }

    #[test]
    fn test_self_pair_rejected() {
        let a = EntityCode::new(223);
        assert!(ContactPair::new(a, a).is_none());
    }
}
