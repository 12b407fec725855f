use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::Progress;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persistence contract for the learner's single progress record.
///
/// Each method is one logical write: implementations must not expose a
/// half-applied update to a later read.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Fetch the stored progress.
    ///
    /// Returns `Ok(None)` when nothing has been recorded yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be read or decoded.
    async fn get_progress(&self) -> Result<Option<Progress>, StorageError>;

    /// Add `delta` points to the stored total, creating the record if needed.
    ///
    /// Returns the new total.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn add_points(&self, delta: u64) -> Result<u64, StorageError>;

    /// Record a badge unless it is already held.
    ///
    /// Returns `true` only if the badge was newly inserted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn insert_badge(
        &self,
        name: &str,
        granted_at: DateTime<Utc>,
    ) -> Result<bool, StorageError>;

    /// Record a badge and add its `bonus` in one write.
    ///
    /// Either both land or neither does. Returns `false`, leaving points
    /// untouched, if the badge was already held.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn grant_badge_with_bonus(
        &self,
        name: &str,
        bonus: u64,
        granted_at: DateTime<Utc>,
    ) -> Result<bool, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    progress: Arc<Mutex<Option<Progress>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing record, e.g. a learner who already has points.
    #[must_use]
    pub fn with_progress(progress: Progress) -> Self {
        Self {
            progress: Arc::new(Mutex::new(Some(progress))),
        }
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn get_progress(&self) -> Result<Option<Progress>, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn add_points(&self, delta: u64) -> Result<u64, StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let progress = guard.get_or_insert_with(Progress::default);
        progress.add_points(delta);
        Ok(progress.points())
    }

    async fn insert_badge(
        &self,
        name: &str,
        _granted_at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get_or_insert_with(Progress::default).insert_badge(name))
    }

    async fn grant_badge_with_bonus(
        &self,
        name: &str,
        bonus: u64,
        _granted_at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let progress = guard.get_or_insert_with(Progress::default);
        if !progress.insert_badge(name) {
            return Ok(false);
        }
        progress.add_points(bonus);
        Ok(true)
    }
}

/// Progress backend behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let progress: Arc<dyn ProgressRepository> = Arc::new(InMemoryRepository::new());
        Self { progress }
    }
}
