use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a Card.
///
/// Opaque and generated per card instance; it carries no ordering information.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(Uuid);

impl CardId {
    /// Generates a fresh random `CardId`.
    #[must_use]
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    #[must_use]
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn value(&self) -> Uuid {
        self.0
    }
}

/// Stable identifier for a Level, unique across the catalog.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelId(u32);

impl LevelId {
    /// Creates a new `LevelId`
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the underlying u32 value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CardId({})", self.0)
    }
}

impl fmt::Debug for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LevelId({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── FromStr Implementations ───────────────────────────────────────────────────

/// Error type for parsing ID from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for CardId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(CardId).map_err(|_| ParseIdError {
            kind: "CardId".to_string(),
        })
    }
}

impl FromStr for LevelId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u32>()
            .map(LevelId::new)
            .map_err(|_| ParseIdError {
                kind: "LevelId".to_string(),
            })
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_ids_are_unique() {
        let a = CardId::new_v4();
        let b = CardId::new_v4();
        assert_ne!(a, b);
    }

    #[test]
    fn test_card_id_from_str() {
        let id = CardId::new_v4();
        let parsed: CardId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_card_id_from_str_invalid() {
        assert!("not-a-uuid".parse::<CardId>().is_err());
    }

    #[test]
    fn test_level_id_display() {
        let id = LevelId::new(100);
        assert_eq!(id.to_string(), "100");
    }

    #[test]
    fn test_level_id_from_str() {
        let id: LevelId = "19".parse().unwrap();
        assert_eq!(id, LevelId::new(19));
    }

    #[test]
    fn test_level_id_from_str_invalid() {
        let err = "-1".parse::<LevelId>().unwrap_err();
        assert_eq!(err.to_string(), "failed to parse LevelId from string");
    }
}
