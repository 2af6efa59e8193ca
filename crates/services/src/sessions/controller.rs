use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, instrument, warn};

use order_core::model::{AppSettings, LevelId, Progress};
use order_core::rewards::RewardEngine;
use order_core::{LevelCatalog, progression};
use storage::repository::KeyValueStore;

use crate::app_settings_service::AppSettingsService;
use crate::error::SessionError;
use crate::feedback::{FeedbackCue, FeedbackSink};
use crate::level_select::{LevelSelectItem, level_select};
use crate::progress_store::ProgressStore;
use crate::timer::{Timer, TimerEvent};

use super::session::{Attempt, AttemptPhase};
use super::view::{CheckOutcome, HintView, Phase, SessionSnapshot, TimerOutcome, WinSummary};

/// Countdown resolution.
pub const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);
/// How long the red highlight stays after a failed check.
pub const HIGHLIGHT_DURATION: Duration = Duration::from_secs(1);

enum ControllerState {
    Idle,
    Active(Attempt),
    AllComplete,
}

impl ControllerState {
    fn phase(&self) -> Phase {
        match self {
            ControllerState::Idle => Phase::Idle,
            ControllerState::AllComplete => Phase::AllComplete,
            ControllerState::Active(attempt) => match attempt.phase {
                AttemptPhase::Playing => Phase::Playing,
                AttemptPhase::Won(_) => Phase::Won,
                AttemptPhase::Lost => Phase::Lost,
            },
        }
    }
}

/// Borrow the live attempt if it is still being played.
fn playing<'a>(
    state: &'a mut ControllerState,
    action: &'static str,
) -> Result<&'a mut Attempt, SessionError> {
    let phase = state.phase();
    match state {
        ControllerState::Active(attempt) if attempt.phase == AttemptPhase::Playing => Ok(attempt),
        _ => Err(SessionError::InvalidTransition { action, phase }),
    }
}

/// Drives one player through levels: shuffles, moves, checks, timers,
/// rewards and persistence.
///
/// The controller is the single writer of `Progress`. Every mutation is
/// applied in memory first and written through `ProgressStore` afterwards;
/// write failures are logged and the in-memory value stays authoritative.
///
/// Timer events come back through `handle_timer`. Each attempt gets a new
/// epoch and events from any other epoch are ignored.
pub struct SessionController {
    catalog: Arc<LevelCatalog>,
    progress_store: ProgressStore,
    progress: Progress,
    settings_service: AppSettingsService,
    settings: AppSettings,
    timer: Arc<dyn Timer>,
    feedback: Arc<dyn FeedbackSink>,
    rng: StdRng,
    epoch: u64,
    state: ControllerState,
}

impl SessionController {
    /// Build a controller and load persisted progress and settings.
    ///
    /// Unreadable entries fall back to defaults; this never fails.
    pub async fn load(
        catalog: Arc<LevelCatalog>,
        values: Arc<dyn KeyValueStore>,
        timer: Arc<dyn Timer>,
        feedback: Arc<dyn FeedbackSink>,
    ) -> Self {
        let progress_store = ProgressStore::new(Arc::clone(&values));
        let settings_service = AppSettingsService::new(values);
        let progress = progress_store.load().await;
        let settings = settings_service.load().await;
        info!(
            levels = catalog.len(),
            score = progress.total_score(),
            "session controller ready"
        );

        Self {
            catalog,
            progress_store,
            progress,
            settings_service,
            settings,
            timer,
            feedback,
            rng: StdRng::from_os_rng(),
            epoch: 0,
            state: ControllerState::Idle,
        }
    }

    /// Use a fixed shuffle seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    // ─── READ ACCESS ──────────────────────────────────────────────────────────

    #[must_use]
    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    #[must_use]
    pub fn settings(&self) -> AppSettings {
        self.settings
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    #[must_use]
    pub fn level_select(&self) -> Vec<LevelSelectItem> {
        level_select(&self.catalog, &self.progress)
    }

    /// Current state as the presentation layer should render it.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let mut snapshot = SessionSnapshot {
            phase: self.phase(),
            level_id: None,
            level_index: None,
            title: None,
            description: None,
            cards: Vec::new(),
            time_remaining: 0,
            incorrect_card_ids: Vec::new(),
            hint: None,
            hint_used: false,
            mistake_made: false,
            win: None,
            total_score: self.progress.total_score(),
            medals: self.progress.medals().iter().copied().collect(),
        };

        if let ControllerState::Active(attempt) = &self.state {
            snapshot.level_id = Some(attempt.level.id());
            snapshot.level_index = Some(attempt.level_index);
            snapshot.title = Some(attempt.level.title().to_string());
            snapshot.description = Some(attempt.level.description().to_string());
            snapshot.cards.clone_from(&attempt.order);
            snapshot.time_remaining = attempt.time_remaining;
            snapshot.incorrect_card_ids = attempt.incorrect.iter().copied().collect();
            snapshot.hint = attempt.hint_used.then(|| hint_view(attempt));
            snapshot.hint_used = attempt.hint_used;
            snapshot.mistake_made = attempt.mistake_made;
            if let AttemptPhase::Won(summary) = &attempt.phase {
                snapshot.win = Some(summary.clone());
            }
        }

        snapshot
    }

    // ─── INTENTS ──────────────────────────────────────────────────────────────

    /// Begin an attempt at `level_id`, replacing whatever was running.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownLevel` for ids outside the catalog and
    /// `SessionError::LevelLocked` for special levels the score does not
    /// cover yet.
    #[instrument(skip(self))]
    pub fn start(&mut self, level_id: LevelId) -> Result<SessionSnapshot, SessionError> {
        let index = self
            .catalog
            .index_of(level_id)
            .ok_or(SessionError::UnknownLevel(level_id))?;
        let level = self
            .catalog
            .level_at(index)
            .ok_or(SessionError::UnknownLevel(level_id))?;

        if !progression::is_unlocked(level, &self.progress) {
            let points_missing = progression::points_missing(level, &self.progress);
            debug!(points_missing, "level is locked");
            return Err(SessionError::LevelLocked {
                level_id,
                points_missing,
            });
        }

        self.begin(index);
        Ok(self.snapshot())
    }

    /// Move the cards at `sources` before the card at `destination`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` outside `Playing`, and
    /// `SessionError::EmptyMove` or `SessionError::IndexOutOfBounds` for bad
    /// indices. Nothing changes on error.
    pub fn move_cards(
        &mut self,
        sources: &[usize],
        destination: usize,
    ) -> Result<SessionSnapshot, SessionError> {
        let attempt = playing(&mut self.state, "move cards")?;
        attempt.move_cards(sources, destination)?;
        debug!(?sources, destination, "cards moved");
        self.cue(FeedbackCue::CardMoved);
        Ok(self.snapshot())
    }

    /// Move a single card.
    ///
    /// # Errors
    ///
    /// Same as [`SessionController::move_cards`].
    pub fn move_card(&mut self, from: usize, to: usize) -> Result<SessionSnapshot, SessionError> {
        self.move_cards(&[from], to)
    }

    /// Compare the current order with the solution.
    ///
    /// A wrong order records a mistake and highlights the misplaced cards
    /// for a second. A solved order ends the attempt, scores it and persists
    /// the new progress.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` outside `Playing`.
    #[instrument(skip(self))]
    pub async fn check(&mut self) -> Result<CheckOutcome, SessionError> {
        let attempt = playing(&mut self.state, "check")?;

        if !attempt.is_solved() {
            let incorrect = attempt.misplaced();
            attempt.mistake_made = true;
            attempt.incorrect = incorrect.iter().copied().collect();
            self.timer.once(
                HIGHLIGHT_DURATION,
                TimerEvent::HighlightExpired {
                    epoch: attempt.epoch,
                },
            );
            debug!(misplaced = incorrect.len(), "check failed");
            return Ok(CheckOutcome::Incorrect { incorrect });
        }

        if let Some(handle) = attempt.take_countdown() {
            self.timer.cancel(handle);
        }
        attempt.incorrect.clear();

        let outcome = attempt.outcome();
        let level_id = attempt.level.id();
        let reward = RewardEngine::award(outcome, &mut self.progress);
        let summary = WinSummary {
            level_id,
            points: reward.points,
            bonus: reward.bonus,
            medals: reward.medals,
            has_next_level: self.catalog.next_index(attempt.level_index).is_some(),
        };
        attempt.phase = AttemptPhase::Won(summary.clone());

        info!(
            level = %level_id,
            points = summary.points,
            bonus = summary.bonus,
            medals = ?summary.medals,
            score = self.progress.total_score(),
            "level solved"
        );

        self.progress.mark_level_completed(level_id);
        self.persist_progress().await;
        self.cue(FeedbackCue::LevelSolved);

        Ok(CheckOutcome::Solved(summary))
    }

    /// Reveal the solution and fact, charging the hint penalty right away.
    ///
    /// Every request is charged, also repeated ones in the same attempt.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` outside `Playing`.
    #[instrument(skip(self))]
    pub async fn request_hint(&mut self) -> Result<HintView, SessionError> {
        let attempt = playing(&mut self.state, "request a hint")?;
        attempt.hint_used = true;
        let view = hint_view(attempt);

        RewardEngine::apply_hint_penalty(&mut self.progress);
        info!(score = self.progress.total_score(), "hint penalty applied");
        self.persist_progress().await;

        Ok(view)
    }

    /// Feed a delivered timer event back into the session.
    pub fn handle_timer(&mut self, event: TimerEvent) -> TimerOutcome {
        let ControllerState::Active(attempt) = &mut self.state else {
            return TimerOutcome::Ignored;
        };
        if attempt.epoch != event.epoch() {
            debug!(?event, live = attempt.epoch, "ignoring stale timer event");
            return TimerOutcome::Ignored;
        }

        match event {
            TimerEvent::CountdownTick { .. } => {
                if attempt.phase != AttemptPhase::Playing {
                    return TimerOutcome::Ignored;
                }
                if !attempt.tick() {
                    return TimerOutcome::Ticked {
                        remaining: attempt.time_remaining,
                    };
                }
                if let Some(handle) = attempt.take_countdown() {
                    self.timer.cancel(handle);
                }
                attempt.phase = AttemptPhase::Lost;
                info!(level = %attempt.level.id(), "time ran out");
                TimerOutcome::TimedOut
            }
            TimerEvent::HighlightExpired { .. } => {
                if attempt.incorrect.is_empty() {
                    return TimerOutcome::Ignored;
                }
                attempt.incorrect.clear();
                TimerOutcome::HighlightCleared
            }
        }
    }

    /// Replay the same level after running out of time.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless the attempt was lost.
    pub fn retry(&mut self) -> Result<SessionSnapshot, SessionError> {
        let phase = self.phase();
        let ControllerState::Active(attempt) = &self.state else {
            return Err(SessionError::InvalidTransition {
                action: "retry",
                phase,
            });
        };
        if phase != Phase::Lost {
            return Err(SessionError::InvalidTransition {
                action: "retry",
                phase,
            });
        }

        let index = attempt.level_index;
        self.begin(index);
        Ok(self.snapshot())
    }

    /// Continue to the next level in catalog order after a win.
    ///
    /// Past the last level the controller settles in `Phase::AllComplete`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless the attempt was won.
    pub fn advance(&mut self) -> Result<SessionSnapshot, SessionError> {
        let phase = self.phase();
        let ControllerState::Active(attempt) = &self.state else {
            return Err(SessionError::InvalidTransition {
                action: "advance",
                phase,
            });
        };
        if phase != Phase::Won {
            return Err(SessionError::InvalidTransition {
                action: "advance",
                phase,
            });
        }

        match self.catalog.next_index(attempt.level_index) {
            Some(next) => self.begin(next),
            None => {
                self.end_attempt();
                self.state = ControllerState::AllComplete;
                info!("all levels complete");
            }
        }
        Ok(self.snapshot())
    }

    /// Drop the current attempt without touching progress.
    pub fn exit(&mut self) -> SessionSnapshot {
        self.end_attempt();
        self.state = ControllerState::Idle;
        self.snapshot()
    }

    /// Wipe score, medals, streaks and completed levels.
    ///
    /// A running attempt keeps going; only stored progress is cleared.
    #[instrument(skip(self))]
    pub async fn reset_progress(&mut self) {
        self.progress = Progress::default();
        if let Err(err) = self.progress_store.reset().await {
            warn!(error = %err, "failed to clear stored progress");
        }
        info!("progress reset");
    }

    pub async fn set_sound_enabled(&mut self, enabled: bool) -> AppSettings {
        self.update_settings(self.settings.with_sound_enabled(enabled))
            .await
    }

    pub async fn mark_onboarding_seen(&mut self) -> AppSettings {
        self.update_settings(self.settings.with_onboarding_seen()).await
    }

    // ─── INTERNALS ────────────────────────────────────────────────────────────

    fn begin(&mut self, index: usize) {
        self.end_attempt();
        let Some(level) = self.catalog.level_at(index).cloned() else {
            self.state = ControllerState::Idle;
            return;
        };

        self.epoch += 1;
        let mut attempt = Attempt::new(self.epoch, index, level, &mut self.rng);
        attempt.countdown = Some(self.timer.every(
            COUNTDOWN_PERIOD,
            TimerEvent::CountdownTick { epoch: self.epoch },
        ));
        info!(
            level = %attempt.level.id(),
            index,
            epoch = self.epoch,
            "attempt started"
        );
        self.state = ControllerState::Active(attempt);
    }

    fn end_attempt(&mut self) {
        if let ControllerState::Active(attempt) = &mut self.state {
            if let Some(handle) = attempt.take_countdown() {
                self.timer.cancel(handle);
            }
        }
    }

    async fn persist_progress(&self) {
        if let Err(err) = self.progress_store.save(&self.progress).await {
            warn!(error = %err, "failed to persist progress");
        }
    }

    async fn update_settings(&mut self, settings: AppSettings) -> AppSettings {
        self.settings = settings;
        if let Err(err) = self.settings_service.save(settings).await {
            warn!(error = %err, "failed to persist settings");
        }
        self.settings
    }

    fn cue(&self, cue: FeedbackCue) {
        if self.settings.sound_enabled() {
            self.feedback.play(cue);
        }
    }
}

fn hint_view(attempt: &Attempt) -> HintView {
    HintView {
        level_id: attempt.level.id(),
        solved_order: attempt.level.solved_order(),
        fact: attempt.level.fact().to_string(),
    }
}
