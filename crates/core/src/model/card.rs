use serde::{Deserialize, Serialize};

use crate::model::ids::CardId;

//
// ─── CARD TYPES ────────────────────────────────────────────────────────────────
//

/// Catalog-side description of a card before it gets an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDraft {
    pub value: String,
    pub position: usize,
}

impl CardDraft {
    #[must_use]
    pub fn new(value: impl Into<String>, position: usize) -> Self {
        Self {
            value: value.into(),
            position,
        }
    }

    #[must_use]
    pub fn assign_id(self, id: CardId) -> Card {
        Card {
            id,
            value: self.value,
            correct_position: self.position,
        }
    }
}

/// An orderable item with a label and its target slot.
///
/// Equality follows identity, not label: two cards with the same text are
/// still distinct cards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    id: CardId,
    value: String,
    correct_position: usize,
}

impl Card {
    #[must_use]
    pub fn new(value: impl Into<String>, correct_position: usize) -> Self {
        CardDraft::new(value, correct_position).assign_id(CardId::new_v4())
    }

    #[must_use]
    pub fn id(&self) -> CardId {
        self.id
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn correct_position(&self) -> usize {
        self.correct_position
    }

    /// Returns true when the card sits in its target slot.
    #[must_use]
    pub fn is_at(&self, index: usize) -> bool {
        self.correct_position == index
    }
}

impl PartialEq for Card {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Card {}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
