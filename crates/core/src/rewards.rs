use serde::{Deserialize, Serialize};

use crate::model::{Medal, Progress};

/// Points for solving any level.
pub const BASE_POINTS: i64 = 100;
/// Bonus for solving without opening the hint.
pub const NO_HINT_BONUS: i64 = 20;
/// Bonus for solving without a failed check.
pub const NO_MISTAKE_BONUS: i64 = 20;
/// Immediate deduction for opening the hint.
pub const HINT_PENALTY: i64 = 30;
/// Seconds that must remain on the clock to earn `Medal::Speedster`.
pub const SPEEDSTER_MIN_SECONDS: u32 = 20;
/// Mistake-free streak length that earns `Medal::Perfectionist`.
pub const PERFECTIONIST_STREAK: u32 = 3;
/// Score divisor used to derive the milestone count.
pub const MILESTONE_STEP: i64 = 100;
/// Milestone thresholds, checked in order.
pub const MILESTONES: [(i64, Medal); 3] = [
    (5, Medal::Bronze),
    (15, Medal::Silver),
    (30, Medal::Gold),
];

//
// ─── OUTCOME ───────────────────────────────────────────────────────────────────
//

/// What the player did during a winning attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub hint_used: bool,
    pub mistake_made: bool,
    pub time_remaining: u32,
}

//
// ─── REWARD ────────────────────────────────────────────────────────────────────
//

/// Scored result of a win, plus the streak values to store afterwards.
///
/// `medals` lists every medal whose rule fired for this win, in evaluation
/// order, including medals the player already held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub points: i64,
    pub bonus: i64,
    pub medals: Vec<Medal>,
    pub levels_without_hints: u32,
    pub levels_no_mistakes_in_row: u32,
}

impl Reward {
    /// Score delta this reward applies.
    #[must_use]
    pub fn total(&self) -> i64 {
        self.points + self.bonus
    }
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

/// Scoring and medal rules for a solved level.
///
/// # Examples
///
/// ```
/// # use order_core::model::{Medal, Progress};
/// # use order_core::rewards::{RewardEngine, SessionOutcome};
/// let mut progress = Progress::default();
/// let outcome = SessionOutcome { hint_used: false, mistake_made: false, time_remaining: 25 };
///
/// let reward = RewardEngine::award(outcome, &mut progress);
///
/// assert_eq!((reward.points, reward.bonus), (100, 40));
/// assert_eq!(reward.medals, vec![Medal::Speedster]);
/// assert_eq!(progress.total_score(), 140);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RewardEngine;

impl RewardEngine {
    /// Score a win against a progress snapshot without mutating anything.
    #[must_use]
    pub fn evaluate(outcome: SessionOutcome, progress: &Progress) -> Reward {
        let mut bonus = 0;

        let levels_without_hints = if outcome.hint_used {
            0
        } else {
            bonus += NO_HINT_BONUS;
            progress.levels_without_hints().saturating_add(1)
        };

        let levels_no_mistakes_in_row = if outcome.mistake_made {
            0
        } else {
            bonus += NO_MISTAKE_BONUS;
            progress.levels_no_mistakes_in_row().saturating_add(1)
        };

        let mut medals = Vec::new();
        if outcome.time_remaining >= SPEEDSTER_MIN_SECONDS {
            medals.push(Medal::Speedster);
        }
        if levels_no_mistakes_in_row >= PERFECTIONIST_STREAK {
            medals.push(Medal::Perfectionist);
        }

        // Milestones read the score before this win is added.
        let completed = progress.total_score().div_euclid(MILESTONE_STEP);
        medals.extend(
            MILESTONES
                .iter()
                .filter(|(threshold, _)| completed >= *threshold)
                .map(|(_, medal)| *medal),
        );

        Reward {
            points: BASE_POINTS,
            bonus,
            medals,
            levels_without_hints,
            levels_no_mistakes_in_row,
        }
    }

    /// Write a reward into progress: streaks, medals, then score.
    pub fn apply(reward: &Reward, progress: &mut Progress) {
        progress.set_streaks(reward.levels_without_hints, reward.levels_no_mistakes_in_row);
        for medal in &reward.medals {
            progress.award_medal(*medal);
        }
        progress.add_score(reward.total());
    }

    /// Evaluate and apply in one step.
    pub fn award(outcome: SessionOutcome, progress: &mut Progress) -> Reward {
        let reward = Self::evaluate(outcome, progress);
        Self::apply(&reward, progress);
        reward
    }

    /// Deduct the hint penalty.
    pub fn apply_hint_penalty(progress: &mut Progress) {
        progress.add_score(-HINT_PENALTY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn perfect(time_remaining: u32) -> SessionOutcome {
        SessionOutcome {
            hint_used: false,
            mistake_made: false,
            time_remaining,
        }
    }

    fn with_score(score: i64) -> Progress {
        Progress::from_persisted(score, BTreeSet::new(), 0, 0, BTreeSet::new())
    }

    #[test]
    fn fresh_perfect_fast_win() {
        let mut progress = Progress::default();
        let reward = RewardEngine::award(perfect(25), &mut progress);

        assert_eq!(reward.points, 100);
        assert_eq!(reward.bonus, 40);
        assert_eq!(reward.medals, vec![Medal::Speedster]);
        assert_eq!(progress.total_score(), 140);
        assert_eq!(progress.levels_without_hints(), 1);
        assert_eq!(progress.levels_no_mistakes_in_row(), 1);
    }

    #[test]
    fn slow_win_below_bronze_gets_no_medal() {
        let mut progress = with_score(450);
        let reward = RewardEngine::award(perfect(10), &mut progress);

        assert!(reward.medals.is_empty());
        assert!(progress.medals().is_empty());
        assert_eq!(progress.total_score(), 590);
    }

    #[test]
    fn milestone_uses_score_before_the_win() {
        let mut progress = with_score(499);
        let reward = RewardEngine::evaluate(perfect(0), &progress);
        assert!(!reward.medals.contains(&Medal::Bronze));

        RewardEngine::apply(&reward, &mut progress);
        let next = RewardEngine::evaluate(perfect(0), &progress);
        assert!(next.medals.contains(&Medal::Bronze));
    }

    #[test]
    fn all_milestones_can_fire_together() {
        let progress = with_score(3_000);
        let reward = RewardEngine::evaluate(perfect(0), &progress);
        assert_eq!(reward.medals, vec![Medal::Bronze, Medal::Silver, Medal::Gold]);
    }

    #[test]
    fn third_perfect_win_earns_perfectionist() {
        let mut progress = Progress::default();
        let first = RewardEngine::award(perfect(0), &mut progress);
        let second = RewardEngine::award(perfect(0), &mut progress);
        let third = RewardEngine::award(perfect(0), &mut progress);

        assert!(!first.medals.contains(&Medal::Perfectionist));
        assert!(!second.medals.contains(&Medal::Perfectionist));
        assert!(third.medals.contains(&Medal::Perfectionist));
        assert!(progress.has_medal(Medal::Perfectionist));
    }

    #[test]
    fn hint_and_mistake_reset_streaks_and_drop_bonus() {
        let mut progress = Progress::default();
        RewardEngine::award(perfect(0), &mut progress);
        RewardEngine::award(perfect(0), &mut progress);

        let reward = RewardEngine::award(
            SessionOutcome {
                hint_used: true,
                mistake_made: true,
                time_remaining: 0,
            },
            &mut progress,
        );

        assert_eq!(reward.bonus, 0);
        assert_eq!(progress.levels_without_hints(), 0);
        assert_eq!(progress.levels_no_mistakes_in_row(), 0);
    }

    #[test]
    fn streaks_count_consecutive_clean_wins() {
        let mut progress = Progress::default();
        for _ in 0..7 {
            RewardEngine::award(perfect(0), &mut progress);
        }
        assert_eq!(progress.levels_without_hints(), 7);
        assert_eq!(progress.levels_no_mistakes_in_row(), 7);
    }

    #[test]
    fn rewarding_gold_twice_keeps_one_medal() {
        let mut progress = with_score(3_000);
        RewardEngine::award(perfect(0), &mut progress);
        let before = progress.medals().len();
        RewardEngine::award(perfect(0), &mut progress);
        assert_eq!(progress.medals().len(), before);
    }

    #[test]
    fn negative_score_never_reaches_milestones() {
        let progress = with_score(-900);
        let reward = RewardEngine::evaluate(perfect(0), &progress);
        assert!(reward.medals.is_empty());
    }

    #[test]
    fn hint_penalty_is_thirty() {
        let mut progress = with_score(10);
        RewardEngine::apply_hint_penalty(&mut progress);
        assert_eq!(progress.total_score(), -20);
    }
}
