#![forbid(unsafe_code)]

pub mod app_services;
pub mod app_settings_service;
pub mod error;
pub mod feedback;
pub mod level_select;
pub mod progress_store;
pub mod sessions;
pub mod timer;

pub use sessions as session;

pub use app_services::AppServices;
pub use app_settings_service::AppSettingsService;
pub use error::{AppServicesError, AppSettingsServiceError, SessionError};
pub use feedback::{FeedbackCue, FeedbackSink, RecordingFeedback, SilentFeedback};
pub use level_select::{LevelSelectItem, level_select};
pub use progress_store::ProgressStore;
pub use timer::{ManualTimer, Timer, TimerEvent, TimerHandle, TokioTimer};

pub use sessions::{
    CheckOutcome, HintView, Phase, SessionController, SessionSnapshot, TimerOutcome, WinSummary,
};
