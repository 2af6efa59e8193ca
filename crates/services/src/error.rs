//! Shared error types for the services crate.

use thiserror::Error;

use order_core::CatalogError;
use order_core::model::LevelId;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

use crate::sessions::Phase;

/// Errors emitted by `SessionController` intents.
///
/// A rejected intent leaves the session exactly as it was.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("level {0} does not exist")]
    UnknownLevel(LevelId),
    #[error("level {level_id} is locked ({points_missing} more points needed)")]
    LevelLocked {
        level_id: LevelId,
        points_missing: u32,
    },
    #[error("cannot {action} while {phase}")]
    InvalidTransition { action: &'static str, phase: Phase },
    #[error("move needs at least one source index")]
    EmptyMove,
    #[error("index {index} is out of bounds for {len} cards")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// Errors emitted by `AppSettingsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppSettingsServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
