mod app_settings;
mod card;
mod ids;
mod level;
mod progress;

pub use ids::{CardId, LevelId, ParseIdError};

pub use app_settings::AppSettings;
pub use card::{Card, CardDraft};
pub use level::{Level, LevelDraft, LevelError, MIN_CARDS_PER_LEVEL};
pub use progress::{Medal, Progress, UnknownMedal};
