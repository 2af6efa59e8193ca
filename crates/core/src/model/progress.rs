use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::LevelId;

//
// ─── MEDALS ────────────────────────────────────────────────────────────────────
//

/// Named achievement flag. Held in a set, so awarding twice is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Medal {
    Speedster,
    Perfectionist,
    Bronze,
    Silver,
    Gold,
}

impl Medal {
    pub const ALL: [Medal; 5] = [
        Medal::Speedster,
        Medal::Perfectionist,
        Medal::Bronze,
        Medal::Silver,
        Medal::Gold,
    ];

    /// Stable persisted name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Medal::Speedster => "speedster",
            Medal::Perfectionist => "perfectionist",
            Medal::Bronze => "bronze",
            Medal::Silver => "silver",
            Medal::Gold => "gold",
        }
    }
}

impl fmt::Display for Medal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown medal: {0}")]
pub struct UnknownMedal(pub String);

impl FromStr for Medal {
    type Err = UnknownMedal;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Medal::ALL
            .into_iter()
            .find(|medal| medal.as_str() == s)
            .ok_or_else(|| UnknownMedal(s.to_string()))
    }
}

//
// ─── PROGRESS ──────────────────────────────────────────────────────────────────
//

/// Persistent cross-session player state.
///
/// Defaults are all zero / empty, which is also what a reset restores.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Progress {
    total_score: i64,
    medals: BTreeSet<Medal>,
    levels_without_hints: u32,
    levels_no_mistakes_in_row: u32,
    completed_level_ids: BTreeSet<LevelId>,
}

impl Progress {
    /// Rehydrate progress from persisted values.
    #[must_use]
    pub fn from_persisted(
        total_score: i64,
        medals: BTreeSet<Medal>,
        levels_without_hints: u32,
        levels_no_mistakes_in_row: u32,
        completed_level_ids: BTreeSet<LevelId>,
    ) -> Self {
        Self {
            total_score,
            medals,
            levels_without_hints,
            levels_no_mistakes_in_row,
            completed_level_ids,
        }
    }

    #[must_use]
    pub fn total_score(&self) -> i64 {
        self.total_score
    }

    #[must_use]
    pub fn medals(&self) -> &BTreeSet<Medal> {
        &self.medals
    }

    #[must_use]
    pub fn has_medal(&self, medal: Medal) -> bool {
        self.medals.contains(&medal)
    }

    #[must_use]
    pub fn levels_without_hints(&self) -> u32 {
        self.levels_without_hints
    }

    #[must_use]
    pub fn levels_no_mistakes_in_row(&self) -> u32 {
        self.levels_no_mistakes_in_row
    }

    #[must_use]
    pub fn completed_level_ids(&self) -> &BTreeSet<LevelId> {
        &self.completed_level_ids
    }

    #[must_use]
    pub fn is_completed(&self, level_id: LevelId) -> bool {
        self.completed_level_ids.contains(&level_id)
    }

    /// Add (or, with a negative delta, subtract) points.
    pub fn add_score(&mut self, delta: i64) {
        self.total_score = self.total_score.saturating_add(delta);
    }

    /// Returns true if the medal was not held before.
    pub fn award_medal(&mut self, medal: Medal) -> bool {
        self.medals.insert(medal)
    }

    pub fn set_streaks(&mut self, levels_without_hints: u32, levels_no_mistakes_in_row: u32) {
        self.levels_without_hints = levels_without_hints;
        self.levels_no_mistakes_in_row = levels_no_mistakes_in_row;
    }

    /// Returns true if the level was not already marked.
    pub fn mark_level_completed(&mut self, level_id: LevelId) -> bool {
        self.completed_level_ids.insert(level_id)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn medal_names_round_trip() {
        for medal in Medal::ALL {
            assert_eq!(medal.as_str().parse::<Medal>().unwrap(), medal);
        }
        assert!("platinum".parse::<Medal>().is_err());
    }

    #[test]
    fn awarding_same_medal_twice_keeps_one() {
        let mut progress = Progress::default();
        assert!(progress.award_medal(Medal::Gold));
        assert!(!progress.award_medal(Medal::Gold));
        assert_eq!(progress.medals().len(), 1);
    }

    #[test]
    fn score_can_go_negative() {
        let mut progress = Progress::default();
        progress.add_score(-30);
        assert_eq!(progress.total_score(), -30);
    }

    #[test]
    fn marking_completed_is_idempotent() {
        let mut progress = Progress::default();
        assert!(progress.mark_level_completed(LevelId::new(3)));
        assert!(!progress.mark_level_completed(LevelId::new(3)));
        assert_eq!(progress.completed_level_ids().len(), 1);
        assert!(progress.is_completed(LevelId::new(3)));
    }
}
