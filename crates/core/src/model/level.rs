use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{
    card::{Card, CardDraft},
    ids::{CardId, LevelId},
};

/// Smallest number of cards a level may hold.
pub const MIN_CARDS_PER_LEVEL: usize = 2;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LevelError {
    #[error("level title cannot be empty")]
    EmptyTitle,

    #[error("level needs at least 2 cards, got {count}")]
    TooFewCards { count: usize },

    #[error("card position {position} is out of range for {len} cards")]
    PositionOutOfRange { position: usize, len: usize },

    #[error("card position {position} is used more than once")]
    DuplicatePosition { position: usize },

    #[error("special level must require more than 0 points")]
    MissingRequirement,
}

//
// ─── LEVEL TYPES ───────────────────────────────────────────────────────────────
//

/// Unvalidated level definition, as written in catalog configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDraft {
    pub id: LevelId,
    pub title: String,
    pub description: String,
    pub fact: String,
    pub cards: Vec<CardDraft>,
    #[serde(default)]
    pub special: bool,
    #[serde(default)]
    pub required_points: u32,
}

impl LevelDraft {
    /// Validate the draft and give every card a fresh identity.
    ///
    /// # Errors
    ///
    /// Returns `LevelError` when the title is blank, there are fewer than two
    /// cards, the card positions are not a permutation of `0..n`, or a special
    /// level has no point requirement.
    pub fn validate(self) -> Result<Level, LevelError> {
        if self.title.trim().is_empty() {
            return Err(LevelError::EmptyTitle);
        }

        let len = self.cards.len();
        if len < MIN_CARDS_PER_LEVEL {
            return Err(LevelError::TooFewCards { count: len });
        }

        let mut seen = vec![false; len];
        for card in &self.cards {
            let slot = seen
                .get_mut(card.position)
                .ok_or(LevelError::PositionOutOfRange {
                    position: card.position,
                    len,
                })?;
            if *slot {
                return Err(LevelError::DuplicatePosition {
                    position: card.position,
                });
            }
            *slot = true;
        }

        if self.special && self.required_points == 0 {
            return Err(LevelError::MissingRequirement);
        }

        Ok(Level {
            id: self.id,
            title: self.title,
            description: self.description,
            fact: self.fact,
            cards: self
                .cards
                .into_iter()
                .map(|draft| draft.assign_id(CardId::new_v4()))
                .collect(),
            special: self.special,
            required_points: self.required_points,
        })
    }
}

/// A fixed puzzle: cards plus narrative text plus unlock requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    id: LevelId,
    title: String,
    description: String,
    fact: String,
    cards: Vec<Card>,
    special: bool,
    required_points: u32,
}

impl Level {
    #[must_use]
    pub fn id(&self) -> LevelId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn fact(&self) -> &str {
        &self.fact
    }

    /// Cards in their authored order (not necessarily solved order).
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    #[must_use]
    pub fn is_special(&self) -> bool {
        self.special
    }

    #[must_use]
    pub fn required_points(&self) -> u32 {
        self.required_points
    }

    /// The unique correct arrangement: cards sorted by target position.
    #[must_use]
    pub fn solved_order(&self) -> Vec<Card> {
        let mut cards = self.cards.clone();
        cards.sort_by_key(Card::correct_position);
        cards
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
