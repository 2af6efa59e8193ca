use std::fmt;

use serde::Serialize;

use order_core::model::{Card, CardId, LevelId, Medal};

/// Where the controller currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No session; the host shows the level picker.
    Idle,
    Playing,
    Won,
    Lost,
    /// The last level in the catalog was won and advanced past.
    AllComplete,
}

impl Phase {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Playing => "playing",
            Phase::Won => "won",
            Phase::Lost => "lost",
            Phase::AllComplete => "all_complete",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data for the win overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WinSummary {
    pub level_id: LevelId,
    pub points: i64,
    pub bonus: i64,
    /// Every medal whose rule fired for this win, in evaluation order.
    pub medals: Vec<Medal>,
    pub has_next_level: bool,
}

impl WinSummary {
    #[must_use]
    pub fn total(&self) -> i64 {
        self.points + self.bonus
    }
}

/// Read-only solution shown once the hint has been requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HintView {
    pub level_id: LevelId,
    pub solved_order: Vec<Card>,
    pub fact: String,
}

/// Everything the presentation layer needs to render the current state.
///
/// Produced fresh after every intent; holding one never blocks the
/// controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub level_id: Option<LevelId>,
    pub level_index: Option<usize>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub cards: Vec<Card>,
    pub time_remaining: u32,
    pub incorrect_card_ids: Vec<CardId>,
    pub hint: Option<HintView>,
    pub hint_used: bool,
    pub mistake_made: bool,
    pub win: Option<WinSummary>,
    pub total_score: i64,
    pub medals: Vec<Medal>,
}

/// Result of a `check` intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Solved(WinSummary),
    /// Cards sitting in the wrong slot, in display order.
    Incorrect { incorrect: Vec<CardId> },
}

/// What a delivered timer event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOutcome {
    /// Stale or irrelevant event; nothing changed.
    Ignored,
    Ticked { remaining: u32 },
    TimedOut,
    HighlightCleared,
}
