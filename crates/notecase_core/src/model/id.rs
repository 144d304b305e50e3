//! Record identifiers shared by categories and notes.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a category or note.
///
/// Documents written by the browser edition carry numeric ids, so both
/// shapes are accepted on read. A number never equals a string, even when
/// they render the same.
///
/// Numeric ids must be non-negative integers; fractional or negative JSON
/// numbers are rejected, which fails the whole import. Ids that browser
/// builds produced (`Date.now()` values and the starter 1..=4) all fit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Numeric id (starter set and legacy documents).
    Number(u64),
    /// Textual id minted by `RecordId::generate`.
    Text(String),
}

impl RecordId {
    /// Mints a new collision-free id.
    pub fn generate() -> Self {
        Self::Text(Uuid::new_v4().to_string())
    }

    /// Parses user input: digits become `Number`, anything else `Text`.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.parse::<u64>() {
            Ok(number) => Some(Self::Number(number)),
            Err(_) => Some(Self::Text(trimmed.to_string())),
        }
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value}"),
        }
    }
}

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}

#[cfg(test)]
mod tests {
    use super::RecordId;
    use std::collections::HashSet;

    #[test]
    fn generated_ids_do_not_collide_under_rapid_creation() {
        let ids: HashSet<RecordId> = (0..1_000).map(|_| RecordId::generate()).collect();
        assert_eq!(ids.len(), 1_000);
    }

    #[test]
    fn number_and_text_ids_deserialize_from_legacy_json() {
        let ids: Vec<RecordId> = serde_json::from_str(r#"[4, "a1b2"]"#).unwrap();
        assert_eq!(ids[0], RecordId::Number(4));
        assert_eq!(ids[1], RecordId::Text("a1b2".to_string()));
        assert_ne!(RecordId::Number(4), RecordId::Text("4".to_string()));
    }

    #[test]
    fn fractional_and_negative_numbers_are_not_ids() {
        assert!(serde_json::from_str::<RecordId>("1.5").is_err());
        assert!(serde_json::from_str::<RecordId>("-3").is_err());
        assert_eq!(
            serde_json::from_str::<RecordId>("1700000000000").unwrap(),
            RecordId::Number(1_700_000_000_000)
        );
    }

    #[test]
    fn parse_maps_digits_to_numbers() {
        assert_eq!(RecordId::parse(" 17 "), Some(RecordId::Number(17)));
        assert_eq!(
            RecordId::parse("abc"),
            Some(RecordId::Text("abc".to_string()))
        );
        assert_eq!(RecordId::parse("  "), None);
    }
}
