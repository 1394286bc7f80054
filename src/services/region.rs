//! Home region classification.

use crate::models::EntityCode;
use std::collections::HashSet;

/// Home regions of the default deployment: England, Scotland, Wales,
/// Northern Ireland, Ireland and the Isle of Man.
pub const DEFAULT_HOME_REGIONS: [i64; 6] = [223, 279, 294, 265, 245, 114];

/// Fixed set of entity codes treated as the deployment's regions of interest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeRegions {
    codes: HashSet<EntityCode>,
}

impl HomeRegions {
    /// Creates a home set from the given codes.
    #[must_use]
    pub fn new<I>(codes: I) -> Self
    where
        I: IntoIterator<Item = EntityCode>,
    {
        Self {
            codes: codes.into_iter().collect(),
        }
    }

    /// Returns true if `code` is a home region. Unknown codes are foreign.
    #[must_use]
    pub fn is_home(&self, code: EntityCode) -> bool {
        self.codes.contains(&code)
    }

    /// Home codes in ascending order.
    #[must_use]
    pub fn sorted(&self) -> Vec<EntityCode> {
        let mut codes: Vec<_> = self.codes.iter().copied().collect();
        codes.sort_unstable();
        codes
    }

    /// Number of home regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Returns true if no home region is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Default for HomeRegions {
    fn default() -> Self {
        Self::new(DEFAULT_HOME_REGIONS.into_iter().map(EntityCode::new))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_home_nations() {
        let home = HomeRegions::default();

        assert_eq!(home.len(), 6);
        assert!(home.is_home(EntityCode::new(223)));
        assert!(home.is_home(EntityCode::new(114)));
        assert!(!home.is_home(EntityCode::new(291)));
    }

    #[test]
    fn test_any_integer_is_valid_input() {
        let home = HomeRegions::new([EntityCode::new(1)]);

        assert!(!home.is_home(EntityCode::new(i64::MIN)));
        assert!(!home.is_home(EntityCode::new(0)));
    }

    #[test]
    fn test_sorted_is_ascending() {
        let codes: Vec<i64> = HomeRegions::default().sorted().iter().map(|c| c.get()).collect();
        assert_eq!(codes, vec![114, 223, 245, 265, 279, 294]);
    }
}
