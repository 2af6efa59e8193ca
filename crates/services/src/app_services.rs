use std::sync::Arc;

use order_core::LevelCatalog;
use storage::repository::Storage;

use crate::app_settings_service::AppSettingsService;
use crate::error::AppServicesError;
use crate::feedback::FeedbackSink;
use crate::progress_store::ProgressStore;
use crate::sessions::SessionController;
use crate::timer::Timer;

/// Assembles the catalog and storage the game runs on.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<LevelCatalog>,
    storage: Storage,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and the built-in catalog.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the catalog is malformed or storage
    /// initialization fails.
    pub async fn new_sqlite(db_url: &str) -> Result<Self, AppServicesError> {
        let catalog = Arc::new(LevelCatalog::builtin()?);
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self { catalog, storage })
    }

    /// Build services over in-memory storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the catalog is malformed.
    pub fn in_memory(catalog: Option<LevelCatalog>) -> Result<Self, AppServicesError> {
        let catalog = match catalog {
            Some(catalog) => catalog,
            None => LevelCatalog::builtin()?,
        };
        Ok(Self {
            catalog: Arc::new(catalog),
            storage: Storage::in_memory(),
        })
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<LevelCatalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn progress_store(&self) -> ProgressStore {
        ProgressStore::new(Arc::clone(&self.storage.values))
    }

    #[must_use]
    pub fn app_settings(&self) -> AppSettingsService {
        AppSettingsService::new(Arc::clone(&self.storage.values))
    }

    /// Load progress and settings into a fresh controller.
    pub async fn controller(
        &self,
        timer: Arc<dyn Timer>,
        feedback: Arc<dyn FeedbackSink>,
    ) -> SessionController {
        SessionController::load(
            self.catalog(),
            Arc::clone(&self.storage.values),
            timer,
            feedback,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::SilentFeedback;
    use crate::sessions::Phase;
    use crate::timer::ManualTimer;
    use order_core::model::LevelId;

    #[tokio::test]
    async fn in_memory_services_drive_the_builtin_catalog() {
        let services = AppServices::in_memory(None).unwrap();
        assert_eq!(services.catalog().len(), 22);

        let mut controller = services
            .controller(Arc::new(ManualTimer::new()), Arc::new(SilentFeedback))
            .await;
        let snapshot = controller.start(LevelId::new(0)).unwrap();
        assert_eq!(snapshot.phase, Phase::Playing);

        controller.request_hint().await.unwrap();
        assert_eq!(services.progress_store().load().await.total_score(), -30);
        assert!(services.app_settings().load().await.sound_enabled());
    }
}
