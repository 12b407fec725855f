use std::sync::Arc;

use quiz_core::model::RewardPolicy;
use storage::repository::Storage;

use crate::Clock;
use crate::catalog::QuizCatalog;
use crate::error::AppServicesError;
use crate::progress_store::ProgressStore;
use crate::quiz::QuizLoopService;

/// Assembles app-facing services over one progress backend.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<QuizCatalog>,
    quiz_loop: Arc<QuizLoopService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        policy: RewardPolicy,
        catalog: QuizCatalog,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, policy, catalog))
    }

    /// Build services over a throwaway in-memory backend.
    #[must_use]
    pub fn in_memory(clock: Clock, policy: RewardPolicy, catalog: QuizCatalog) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, policy, catalog)
    }

    fn from_storage(
        storage: &Storage,
        clock: Clock,
        policy: RewardPolicy,
        catalog: QuizCatalog,
    ) -> Self {
        let store = ProgressStore::new(clock, Arc::clone(&storage.progress));
        Self {
            catalog: Arc::new(catalog),
            quiz_loop: Arc::new(QuizLoopService::new(clock, policy, store)),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<QuizCatalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }
}
