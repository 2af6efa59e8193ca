use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, warn};

use order_core::model::{LevelId, Medal, Progress};
use storage::repository::{KeyValueStore, StorageError, StoredValue};

/// Persisted key names.
pub mod keys {
    pub const TOTAL_SCORE: &str = "total_score";
    pub const MEDALS: &str = "medals";
    pub const LEVELS_WITHOUT_HINTS: &str = "levels_without_hints";
    pub const LEVELS_NO_MISTAKES_IN_ROW: &str = "levels_no_mistakes_in_row";
    pub const COMPLETED_LEVELS: &str = "completed_levels";

    pub const ALL: [&str; 5] = [
        TOTAL_SCORE,
        MEDALS,
        LEVELS_WITHOUT_HINTS,
        LEVELS_NO_MISTAKES_IN_ROW,
        COMPLETED_LEVELS,
    ];
}

/// Reads and writes `Progress` through a key-value backend.
///
/// Reads never fail: a missing, unreadable or mistyped entry falls back to
/// its default. Writes report errors and leave recovery to the caller.
#[derive(Clone)]
pub struct ProgressStore {
    values: Arc<dyn KeyValueStore>,
}

impl ProgressStore {
    #[must_use]
    pub fn new(values: Arc<dyn KeyValueStore>) -> Self {
        Self { values }
    }

    /// Load persisted progress, substituting defaults field by field.
    pub async fn load(&self) -> Progress {
        let total_score = self
            .read(keys::TOTAL_SCORE, StoredValue::as_int)
            .await
            .unwrap_or(0);

        let medals = self
            .read(keys::MEDALS, |value| value.as_string_set().cloned())
            .await
            .map(|names| decode_medals(&names))
            .unwrap_or_default();

        let levels_without_hints = self.read_streak(keys::LEVELS_WITHOUT_HINTS).await;
        let levels_no_mistakes_in_row = self.read_streak(keys::LEVELS_NO_MISTAKES_IN_ROW).await;

        let completed = self
            .read(keys::COMPLETED_LEVELS, |value| {
                value.as_text().map(ToString::to_string)
            })
            .await
            .and_then(|raw| match serde_json::from_str::<BTreeSet<LevelId>>(&raw) {
                Ok(ids) => Some(ids),
                Err(err) => {
                    warn!(error = %err, "completed levels entry is corrupt; using empty set");
                    None
                }
            })
            .unwrap_or_default();

        let progress = Progress::from_persisted(
            total_score,
            medals,
            levels_without_hints,
            levels_no_mistakes_in_row,
            completed,
        );
        debug!(score = progress.total_score(), medals = progress.medals().len(), "loaded progress");
        progress
    }

    /// Persist every progress field in one write.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend rejects the write.
    pub async fn save(&self, progress: &Progress) -> Result<(), StorageError> {
        let medals = progress
            .medals()
            .iter()
            .map(|medal| medal.as_str().to_string())
            .collect();

        self.values
            .set_many(&[
                (keys::TOTAL_SCORE, StoredValue::Int(progress.total_score())),
                (keys::MEDALS, StoredValue::StringSet(medals)),
                (
                    keys::LEVELS_WITHOUT_HINTS,
                    StoredValue::Int(i64::from(progress.levels_without_hints())),
                ),
                (
                    keys::LEVELS_NO_MISTAKES_IN_ROW,
                    StoredValue::Int(i64::from(progress.levels_no_mistakes_in_row())),
                ),
                (
                    keys::COMPLETED_LEVELS,
                    encode_completed(progress.completed_level_ids())?,
                ),
            ])
            .await
    }

    /// Remove all persisted progress. A following `load` yields defaults.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend rejects the delete.
    pub async fn reset(&self) -> Result<(), StorageError> {
        self.values.remove(&keys::ALL).await
    }

    /// Add a level to the completed set and persist the set.
    ///
    /// Marking an already-completed level writes nothing and returns `false`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend rejects the write. The in-memory
    /// set keeps the level either way.
    pub async fn mark_level_completed(
        &self,
        progress: &mut Progress,
        level_id: LevelId,
    ) -> Result<bool, StorageError> {
        if !progress.mark_level_completed(level_id) {
            return Ok(false);
        }
        let encoded = encode_completed(progress.completed_level_ids())?;
        self.values.set(keys::COMPLETED_LEVELS, encoded).await?;
        Ok(true)
    }

    async fn read<T>(&self, key: &str, decode: impl Fn(&StoredValue) -> Option<T>) -> Option<T> {
        match self.values.get(key).await {
            Ok(Some(value)) => {
                let decoded = decode(&value);
                if decoded.is_none() {
                    warn!(key, ?value, "stored value has unexpected type; using default");
                }
                decoded
            }
            Ok(None) => None,
            Err(err) => {
                warn!(key, error = %err, "failed to read stored value; using default");
                None
            }
        }
    }

    async fn read_streak(&self, key: &str) -> u32 {
        self.read(key, StoredValue::as_int)
            .await
            .and_then(|value| u32::try_from(value).ok())
            .unwrap_or(0)
    }
}

fn decode_medals(names: &BTreeSet<String>) -> BTreeSet<Medal> {
    names
        .iter()
        .filter_map(|name| match name.parse::<Medal>() {
            Ok(medal) => Some(medal),
            Err(err) => {
                warn!(error = %err, "skipping unknown stored medal");
                None
            }
        })
        .collect()
}

fn encode_completed(ids: &BTreeSet<LevelId>) -> Result<StoredValue, StorageError> {
    serde_json::to_string(ids)
        .map(StoredValue::Text)
        .map_err(|err| StorageError::Serialization(err.to_string()))
}
