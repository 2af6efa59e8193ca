//! Static, ordered collection of level definitions.
//!
//! The catalog is configuration data: parsed and validated once at startup,
//! never mutated afterwards.

use std::collections::HashSet;

use thiserror::Error;

use crate::model::{Level, LevelDraft, LevelError, LevelId};

const BUILTIN_LEVELS: &str = include_str!("levels.json");

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog contains no levels")]
    Empty,

    #[error("catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("level {id} is malformed: {source}")]
    Level {
        id: LevelId,
        #[source]
        source: LevelError,
    },

    #[error("level id {0} appears more than once")]
    DuplicateLevelId(LevelId),
}

/// Ordered level list. Index 0 is the first normal level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelCatalog {
    levels: Vec<Level>,
}

impl LevelCatalog {
    /// Load the levels shipped with the game.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the embedded configuration is malformed.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_LEVELS)
    }

    /// Parse and validate a JSON array of level drafts.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` for invalid JSON, or any validation error
    /// from [`LevelCatalog::from_drafts`].
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let drafts: Vec<LevelDraft> = serde_json::from_str(raw)?;
        Self::from_drafts(drafts)
    }

    /// Validate drafts in order. Any malformed entry rejects the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Empty`, `CatalogError::Level` or
    /// `CatalogError::DuplicateLevelId`.
    pub fn from_drafts(drafts: Vec<LevelDraft>) -> Result<Self, CatalogError> {
        if drafts.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::with_capacity(drafts.len());
        let mut levels = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let id = draft.id;
            if !seen.insert(id) {
                return Err(CatalogError::DuplicateLevelId(id));
            }
            let level = draft
                .validate()
                .map_err(|source| CatalogError::Level { id, source })?;
            levels.push(level);
        }

        Ok(Self { levels })
    }

    #[must_use]
    pub fn all_levels(&self) -> &[Level] {
        &self.levels
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    #[must_use]
    pub fn level_at(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    #[must_use]
    pub fn index_of(&self, id: LevelId) -> Option<usize> {
        self.levels.iter().position(|level| level.id() == id)
    }

    #[must_use]
    pub fn get(&self, id: LevelId) -> Option<&Level> {
        self.index_of(id).and_then(|index| self.level_at(index))
    }

    /// Index of the level that follows `index` in catalog order, if any.
    #[must_use]
    pub fn next_index(&self, index: usize) -> Option<usize> {
        let next = index.checked_add(1)?;
        (next < self.levels.len()).then_some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_loads() {
        let catalog = LevelCatalog::builtin().unwrap();
        assert_eq!(catalog.len(), 22);
        assert_eq!(catalog.level_at(0).unwrap().id(), LevelId::new(0));
        assert!(!catalog.level_at(0).unwrap().is_special());
    }

    #[test]
    fn builtin_specials_sit_at_the_end() {
        let catalog = LevelCatalog::builtin().unwrap();
        let specials: Vec<_> = catalog
            .all_levels()
            .iter()
            .enumerate()
            .filter(|(_, level)| level.is_special())
            .map(|(index, level)| (index, level.id().value(), level.required_points()))
            .collect();
        assert_eq!(specials, vec![(20, 100, 300), (21, 101, 500)]);
    }

    #[test]
    fn every_level_sorts_into_a_dense_sequence() {
        let catalog = LevelCatalog::builtin().unwrap();
        for level in catalog.all_levels() {
            let positions: Vec<_> = level
                .solved_order()
                .iter()
                .map(|card| card.correct_position())
                .collect();
            let expected: Vec<_> = (0..level.cards().len()).collect();
            assert_eq!(positions, expected, "level {}", level.id());
        }
    }

    #[test]
    fn lookup_and_next_index() {
        let catalog = LevelCatalog::builtin().unwrap();
        assert_eq!(catalog.index_of(LevelId::new(100)), Some(20));
        assert_eq!(catalog.get(LevelId::new(19)).unwrap().title(), "Famous Authors");
        assert_eq!(catalog.next_index(0), Some(1));
        assert_eq!(catalog.next_index(21), None);
        assert!(catalog.get(LevelId::new(55)).is_none());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let raw = r#"[
            {"id": 1, "title": "A", "description": "", "fact": "",
             "cards": [{"value": "x", "position": 0}, {"value": "y", "position": 1}]},
            {"id": 1, "title": "B", "description": "", "fact": "",
             "cards": [{"value": "x", "position": 1}, {"value": "y", "position": 0}]}
        ]"#;
        let err = LevelCatalog::from_json(raw).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateLevelId(id) if id == LevelId::new(1)));
    }

    #[test]
    fn malformed_level_rejects_catalog() {
        let raw = r#"[
            {"id": 7, "title": "A", "description": "", "fact": "",
             "cards": [{"value": "x", "position": 0}]}
        ]"#;
        let err = LevelCatalog::from_json(raw).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Level {
                source: LevelError::TooFewCards { count: 1 },
                ..
            }
        ));
    }

    #[test]
    fn empty_catalog_is_rejected() {
        assert!(matches!(
            LevelCatalog::from_json("[]").unwrap_err(),
            CatalogError::Empty
        ));
        assert!(matches!(
            LevelCatalog::from_json("{").unwrap_err(),
            CatalogError::Parse(_)
        ));
    }
}
