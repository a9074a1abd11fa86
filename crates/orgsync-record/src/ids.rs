//! Record identifier types
//!
//! Newtype wrappers for type-safe identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{RecordError, RecordResult};

/// Identifier of an organization unit.
///
/// Ids travel through the hierarchical record as strings; they must parse
/// as positive integers before any reconciliation proceeds. Parsing is the
/// single validation gate for aggregate ids and linked foreign ids alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrgId(i64);

impl OrgId {
    /// Parse an id from its string representation in a record.
    ///
    /// Rejects anything that is not a positive integer.
    pub fn parse(value: &str) -> RecordResult<Self> {
        match value.parse::<i64>() {
            Ok(id) if id > 0 => Ok(Self(id)),
            _ => Err(RecordError::InvalidId {
                value: value.to_string(),
            }),
        }
    }

    /// Wrap an id already known to be valid (e.g. read back from storage).
    #[must_use]
    pub fn from_i64(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner integer value.
    #[must_use]
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for OrgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrgId {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_id() {
        let id = OrgId::parse("678").unwrap();
        assert_eq!(id.get(), 678);
        assert_eq!(id.to_string(), "678");
    }

    #[test]
    fn test_parse_rejects_non_integer() {
        assert!(OrgId::parse("notAnInt").is_err());
        assert!(OrgId::parse("").is_err());
        assert!(OrgId::parse("12.5").is_err());
    }

    #[test]
    fn test_parse_rejects_non_positive() {
        assert!(OrgId::parse("0").is_err());
        assert!(OrgId::parse("-4").is_err());
    }

    #[test]
    fn test_from_str() {
        let id: OrgId = "22234".parse().unwrap();
        assert_eq!(id, OrgId::from_i64(22234));
    }
}
