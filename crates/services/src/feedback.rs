use std::sync::Mutex;

/// Audible cues the session asks the host to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackCue {
    CardMoved,
    LevelSolved,
}

/// Host hook for sound effects. Only called while sound is enabled.
pub trait FeedbackSink: Send + Sync {
    fn play(&self, cue: FeedbackCue);
}

/// Sink that ignores every cue.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentFeedback;

impl FeedbackSink for SilentFeedback {
    fn play(&self, _cue: FeedbackCue) {}
}

/// Sink that remembers what it was asked to play.
#[derive(Debug, Default)]
pub struct RecordingFeedback {
    played: Mutex<Vec<FeedbackCue>>,
}

impl RecordingFeedback {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn played(&self) -> Vec<FeedbackCue> {
        self.played
            .lock()
            .map(|played| played.clone())
            .unwrap_or_default()
    }
}

impl FeedbackSink for RecordingFeedback {
    fn play(&self, cue: FeedbackCue) {
        if let Ok(mut played) = self.played.lock() {
            played.push(cue);
        }
    }
}
