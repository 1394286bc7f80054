//! Broker topic filters for the home region set.
//!
//! The reporting network publishes each spot on a topic of the form
//!
//! ```text
//! pskr/filter/v2/{band}/{mode}/{sender call}/{receiver call}/
//!     {sender locator}/{receiver locator}/{sender entity}/{receiver entity}
//! ```
//!
//! Subscribing with the home code in either entity position narrows the
//! stream to spots with at least one home side. The transport layer that
//! owns the broker connection uses these filters; the core still re-checks
//! the home rule itself.

use super::HomeRegions;
use crate::{Error, Result};

/// Root of the filtered spot topic tree.
pub const TOPIC_PREFIX: &str = "pskr/filter/v2";

/// Builds the subscription filters for `band` and `mode`.
///
/// Each home region yields two filters: one matching it as sender and one
/// as receiver. Filters are ordered by entity code.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if `band` or `mode` is empty or contains
/// a topic separator or wildcard.
///
/// # Example
///
/// ```rust
/// use spotwatch::models::EntityCode;
/// use spotwatch::services::{HomeRegions, topic_filters};
///
/// let home = HomeRegions::new([EntityCode::new(223)]);
/// let filters = topic_filters("6m", "FT8", &home).unwrap();
/// assert_eq!(filters, vec![
///     "pskr/filter/v2/6m/FT8/+/+/+/+/223/+".to_string(),
///     "pskr/filter/v2/6m/FT8/+/+/+/+/+/223".to_string(),
/// ]);
/// ```
pub fn topic_filters(band: &str, mode: &str, home: &HomeRegions) -> Result<Vec<String>> {
    validate_level("band", band)?;
    validate_level("mode", mode)?;

    Ok(home
        .sorted()
        .into_iter()
        .flat_map(|code| {
            [
                format!("{TOPIC_PREFIX}/{band}/{mode}/+/+/+/+/{code}/+"),
                format!("{TOPIC_PREFIX}/{band}/{mode}/+/+/+/+/+/{code}"),
            ]
        })
        .collect())
}

fn validate_level(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::InvalidInput(format!("{field} must not be empty")));
    }
    if value.contains(['/', '+', '#']) {
        return Err(Error::InvalidInput(format!(
            "{field} '{value}' must not contain '/', '+' or '#'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_home_yields_twelve_filters() {
        let filters = topic_filters("6m", "FT8", &HomeRegions::default()).unwrap();

        assert_eq!(filters.len(), 12);
        assert_eq!(filters[0], "pskr/filter/v2/6m/FT8/+/+/+/+/114/+");
        assert_eq!(filters[1], "pskr/filter/v2/6m/FT8/+/+/+/+/+/114");
        assert_eq!(filters[11], "pskr/filter/v2/6m/FT8/+/+/+/+/+/294");
    }

    #[test]
    fn test_empty_home_yields_nothing() {
        let filters = topic_filters("2m", "FT4", &HomeRegions::new([])).unwrap();
        assert!(filters.is_empty());
    }

    #[test]
    fn test_wildcards_rejected() {
        let home = HomeRegions::default();

        assert!(topic_filters("+", "FT8", &home).is_err());
        assert!(topic_filters("6m", "FT8/#", &home).is_err());
        assert!(topic_filters("", "FT8", &home).is_err());
    }
}
