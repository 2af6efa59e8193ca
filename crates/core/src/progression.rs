//! Unlock policy for special levels. Derived on demand, never stored.

use crate::model::{Level, Progress};

/// Normal levels are always open; special levels need enough total score.
#[must_use]
pub fn is_unlocked(level: &Level, progress: &Progress) -> bool {
    !level.is_special() || progress.total_score() >= i64::from(level.required_points())
}

/// Points still needed before `level` opens. Zero once unlocked.
#[must_use]
pub fn points_missing(level: &Level, progress: &Progress) -> u32 {
    if is_unlocked(level, progress) {
        return 0;
    }
    let missing = i64::from(level.required_points()) - progress.total_score();
    u32::try_from(missing).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CardDraft, LevelDraft, LevelId};
    use std::collections::BTreeSet;

    fn level(special: bool, required_points: u32) -> Level {
        LevelDraft {
            id: LevelId::new(100),
            title: "Super Challenge".into(),
            description: String::new(),
            fact: String::new(),
            cards: vec![CardDraft::new("a", 0), CardDraft::new("b", 1)],
            special,
            required_points,
        }
        .validate()
        .unwrap()
    }

    fn progress(score: i64) -> Progress {
        Progress::from_persisted(score, BTreeSet::new(), 0, 0, BTreeSet::new())
    }

    #[test]
    fn normal_level_is_open_even_with_negative_score() {
        assert!(is_unlocked(&level(false, 0), &progress(-90)));
    }

    #[test]
    fn special_level_opens_at_threshold() {
        let special = level(true, 300);
        assert!(!is_unlocked(&special, &progress(299)));
        assert!(is_unlocked(&special, &progress(300)));
    }

    #[test]
    fn points_missing_counts_down() {
        let special = level(true, 300);
        assert_eq!(points_missing(&special, &progress(120)), 180);
        assert_eq!(points_missing(&special, &progress(-30)), 330);
        assert_eq!(points_missing(&special, &progress(400)), 0);
    }
}
