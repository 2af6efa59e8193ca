mod controller;
mod session;
mod view;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use controller::{COUNTDOWN_PERIOD, HIGHLIGHT_DURATION, SessionController};
pub use session::LEVEL_SECONDS;
pub use view::{CheckOutcome, HintView, Phase, SessionSnapshot, TimerOutcome, WinSummary};
