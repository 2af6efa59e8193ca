use std::sync::Arc;

use tracing::warn;

use order_core::model::AppSettings;
use storage::repository::{KeyValueStore, StoredValue};

use crate::error::AppSettingsServiceError;

pub const SOUND_ENABLED_KEY: &str = "sound_enabled";
pub const HAS_SEEN_ONBOARDING_KEY: &str = "has_seen_onboarding";

#[derive(Clone)]
pub struct AppSettingsService {
    values: Arc<dyn KeyValueStore>,
}

impl AppSettingsService {
    #[must_use]
    pub fn new(values: Arc<dyn KeyValueStore>) -> Self {
        Self { values }
    }

    /// Load persisted settings (or defaults if missing or unreadable).
    pub async fn load(&self) -> AppSettings {
        let defaults = AppSettings::default();
        let sound_enabled = self
            .read_flag(SOUND_ENABLED_KEY)
            .await
            .unwrap_or(defaults.sound_enabled());
        let has_seen_onboarding = self
            .read_flag(HAS_SEEN_ONBOARDING_KEY)
            .await
            .unwrap_or(defaults.has_seen_onboarding());
        AppSettings::new(sound_enabled, has_seen_onboarding)
    }

    /// Persist both flags.
    ///
    /// # Errors
    ///
    /// Returns `AppSettingsServiceError` if persistence fails.
    pub async fn save(&self, settings: AppSettings) -> Result<AppSettings, AppSettingsServiceError> {
        self.values
            .set_many(&[
                (SOUND_ENABLED_KEY, StoredValue::Bool(settings.sound_enabled())),
                (
                    HAS_SEEN_ONBOARDING_KEY,
                    StoredValue::Bool(settings.has_seen_onboarding()),
                ),
            ])
            .await?;
        Ok(settings)
    }

    async fn read_flag(&self, key: &str) -> Option<bool> {
        match self.values.get(key).await {
            Ok(Some(value)) => {
                let flag = value.as_bool();
                if flag.is_none() {
                    warn!(key, ?value, "setting is not a boolean; using default");
                }
                flag
            }
            Ok(None) => None,
            Err(err) => {
                warn!(key, error = %err, "failed to read setting; using default");
                None
            }
        }
    }
}
