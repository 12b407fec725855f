use std::sync::Arc;

use quiz_core::model::Progress;
use storage::repository::{ProgressRepository, StorageError};
use tracing::{debug, warn};

use crate::Clock;

/// Write-through access to the learner's progress record.
///
/// Reads never fail: a missing or unreadable record is the zero value.
/// Writes go straight to the backend and their errors are returned, since a
/// dropped write would lose earned points.
#[derive(Clone)]
pub struct ProgressStore {
    clock: Clock,
    repo: Arc<dyn ProgressRepository>,
}

impl ProgressStore {
    #[must_use]
    pub fn new(clock: Clock, repo: Arc<dyn ProgressRepository>) -> Self {
        Self { clock, repo }
    }

    /// Current progress, or the zero value if none can be read.
    pub async fn load(&self) -> Progress {
        match self.repo.get_progress().await {
            Ok(Some(progress)) => progress,
            Ok(None) => Progress::default(),
            Err(err) => {
                warn!(error = %err, "progress unreadable, starting from zero");
                Progress::default()
            }
        }
    }

    /// Add points and persist immediately. A zero delta does nothing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn apply_points_delta(&self, delta: u64) -> Result<(), StorageError> {
        if delta == 0 {
            return Ok(());
        }
        let total = self.repo.add_points(delta).await?;
        debug!(delta, total, "points applied");
        Ok(())
    }

    /// Grant a badge once. Returns `false` if it was already held.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn grant_badge(&self, name: &str) -> Result<bool, StorageError> {
        self.repo.insert_badge(name, self.clock.now()).await
    }

    /// Grant a badge and pay its bonus as one write.
    ///
    /// Returns `false`, paying nothing, if the badge was already held.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails; nothing is recorded then.
    pub async fn grant_badge_with_bonus(
        &self,
        name: &str,
        bonus: u64,
    ) -> Result<bool, StorageError> {
        let granted = self
            .repo
            .grant_badge_with_bonus(name, bonus, self.clock.now())
            .await?;
        if granted {
            debug!(badge = name, bonus, "badge recorded");
        }
        Ok(granted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use quiz_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    struct BrokenRepository;

    #[async_trait]
    impl ProgressRepository for BrokenRepository {
        async fn get_progress(&self) -> Result<Option<Progress>, StorageError> {
            Err(StorageError::Serialization("corrupt record".into()))
        }

        async fn add_points(&self, _delta: u64) -> Result<u64, StorageError> {
            Err(StorageError::Connection("disk full".into()))
        }

        async fn insert_badge(
            &self,
            _name: &str,
            _granted_at: DateTime<Utc>,
        ) -> Result<bool, StorageError> {
            Err(StorageError::Connection("disk full".into()))
        }

        async fn grant_badge_with_bonus(
            &self,
            _name: &str,
            _bonus: u64,
            _granted_at: DateTime<Utc>,
        ) -> Result<bool, StorageError> {
            Err(StorageError::Connection("disk full".into()))
        }
    }

    fn in_memory() -> ProgressStore {
        ProgressStore::new(fixed_clock(), Arc::new(InMemoryRepository::new()))
    }

    #[tokio::test]
    async fn load_defaults_to_zero() {
        let store = in_memory();
        assert_eq!(store.load().await, Progress::default());
    }

    #[tokio::test]
    async fn points_only_grow() {
        let store = in_memory();
        let mut last = 0;
        for delta in [0, 10, 0, 50, 10] {
            store.apply_points_delta(delta).await.unwrap();
            let now = store.load().await.points();
            assert!(now >= last);
            last = now;
        }
        assert_eq!(last, 70);
    }

    #[tokio::test]
    async fn granting_twice_changes_progress_once() {
        let store = in_memory();
        assert!(store.grant_badge("Perfect Score").await.unwrap());
        let after_first = store.load().await;
        assert!(!store.grant_badge("Perfect Score").await.unwrap());
        assert_eq!(store.load().await, after_first);
    }

    #[tokio::test]
    async fn bonus_is_paid_only_with_a_new_badge() {
        let store = in_memory();
        assert!(store.grant_badge_with_bonus("Eco Warrior", 50).await.unwrap());
        assert!(!store.grant_badge_with_bonus("Eco Warrior", 50).await.unwrap());
        assert_eq!(store.load().await.points(), 50);
    }

    #[tokio::test]
    async fn unreadable_record_loads_as_zero_but_writes_fail() {
        let store = ProgressStore::new(fixed_clock(), Arc::new(BrokenRepository));
        assert_eq!(store.load().await, Progress::default());
        assert!(matches!(
            store.apply_points_delta(10).await,
            Err(StorageError::Connection(_))
        ));
        assert!(store.grant_badge("Perfect Score").await.is_err());
        assert!(store.grant_badge_with_bonus("Perfect Score", 50).await.is_err());
        // Zero deltas never reach the backend.
        assert!(store.apply_points_delta(0).await.is_ok());
    }
}
