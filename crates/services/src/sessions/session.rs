use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::SliceRandom;

use order_core::model::{Card, CardId, Level};
use order_core::rewards::SessionOutcome;

use crate::error::SessionError;
use crate::timer::TimerHandle;

use super::view::WinSummary;

/// Seconds on the clock when an attempt starts.
pub const LEVEL_SECONDS: u32 = 30;

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AttemptPhase {
    Playing,
    Won(WinSummary),
    Lost,
}

//
// ─── ATTEMPT ───────────────────────────────────────────────────────────────────
//

/// One attempt at one level.
///
/// Owns the shuffled order, the clock value and the flags that feed the
/// reward. Timer handles live here so whoever ends the attempt can cancel
/// them.
#[derive(Debug, Clone)]
pub(crate) struct Attempt {
    pub(crate) epoch: u64,
    pub(crate) level_index: usize,
    pub(crate) level: Level,
    pub(crate) order: Vec<Card>,
    pub(crate) time_remaining: u32,
    pub(crate) hint_used: bool,
    pub(crate) mistake_made: bool,
    pub(crate) incorrect: BTreeSet<CardId>,
    pub(crate) phase: AttemptPhase,
    pub(crate) countdown: Option<TimerHandle>,
}

impl Attempt {
    /// Start an attempt with a uniformly shuffled order.
    ///
    /// The shuffle may come out already solved; that is accepted.
    pub(crate) fn new<R: Rng + ?Sized>(
        epoch: u64,
        level_index: usize,
        level: Level,
        rng: &mut R,
    ) -> Self {
        let mut order = level.cards().to_vec();
        order.shuffle(rng);
        Self {
            epoch,
            level_index,
            level,
            order,
            time_remaining: LEVEL_SECONDS,
            hint_used: false,
            mistake_made: false,
            incorrect: BTreeSet::new(),
            phase: AttemptPhase::Playing,
            countdown: None,
        }
    }

    #[must_use]
    pub(crate) fn is_solved(&self) -> bool {
        self.order
            .iter()
            .enumerate()
            .all(|(index, card)| card.is_at(index))
    }

    /// Ids of cards that are not in their target slot, in display order.
    #[must_use]
    pub(crate) fn misplaced(&self) -> Vec<CardId> {
        self.order
            .iter()
            .enumerate()
            .filter(|(index, card)| !card.is_at(*index))
            .map(|(_, card)| card.id())
            .collect()
    }

    /// List move: lift the cards at `sources` (kept in their relative
    /// order) and drop them before the card that sat at `destination`.
    /// A destination equal to the length appends.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyMove` for no sources and
    /// `SessionError::IndexOutOfBounds` for any index past the end. The order
    /// is unchanged on error.
    pub(crate) fn move_cards(
        &mut self,
        sources: &[usize],
        destination: usize,
    ) -> Result<(), SessionError> {
        let len = self.order.len();
        if sources.is_empty() {
            return Err(SessionError::EmptyMove);
        }
        if let Some(&index) = sources.iter().find(|&&index| index >= len) {
            return Err(SessionError::IndexOutOfBounds { index, len });
        }
        if destination > len {
            return Err(SessionError::IndexOutOfBounds {
                index: destination,
                len,
            });
        }

        let lifted: BTreeSet<usize> = sources.iter().copied().collect();
        let insert_at = destination - lifted.range(..destination).count();

        let mut moving = Vec::with_capacity(lifted.len());
        let mut staying = Vec::with_capacity(len - lifted.len());
        for (index, card) in self.order.drain(..).enumerate() {
            if lifted.contains(&index) {
                moving.push(card);
            } else {
                staying.push(card);
            }
        }

        staying.splice(insert_at..insert_at, moving);
        self.order = staying;
        Ok(())
    }

    /// Count one second down. Returns `true` when the clock hits zero.
    pub(crate) fn tick(&mut self) -> bool {
        self.time_remaining = self.time_remaining.saturating_sub(1);
        self.time_remaining == 0
    }

    pub(crate) fn take_countdown(&mut self) -> Option<TimerHandle> {
        self.countdown.take()
    }

    #[must_use]
    pub(crate) fn outcome(&self) -> SessionOutcome {
        SessionOutcome {
            hint_used: self.hint_used,
            mistake_made: self.mistake_made,
            time_remaining: self.time_remaining,
        }
    }
}
