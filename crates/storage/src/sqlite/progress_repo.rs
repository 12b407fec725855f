use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::Progress;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{points_from_i64, points_to_i64, ser};
use crate::repository::{ProgressRepository, StorageError};

const PROGRESS_ROW_ID: i64 = 1;

const ADD_POINTS_SQL: &str = r"
    INSERT INTO progress (id, points)
    VALUES (?1, ?2)
    ON CONFLICT(id) DO UPDATE SET
        points = progress.points + excluded.points
    RETURNING points
";

const INSERT_BADGE_SQL: &str = r"
    INSERT INTO badges (name, granted_at)
    VALUES (?1, ?2)
    ON CONFLICT(name) DO NOTHING
";

fn connection(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn get_progress(&self) -> Result<Option<Progress>, StorageError> {
        let points_row = sqlx::query("SELECT points FROM progress WHERE id = ?1")
            .bind(PROGRESS_ROW_ID)
            .fetch_optional(&self.pool)
            .await
            .map_err(connection)?;

        let badge_rows = sqlx::query("SELECT name FROM badges ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(connection)?;

        if points_row.is_none() && badge_rows.is_empty() {
            return Ok(None);
        }

        let points = match points_row {
            Some(row) => points_from_i64(row.try_get::<i64, _>("points").map_err(ser)?)?,
            None => 0,
        };
        let badges = badge_rows
            .iter()
            .map(|row| row.try_get::<String, _>("name").map_err(ser))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(Progress::new(points, badges)))
    }

    async fn add_points(&self, delta: u64) -> Result<u64, StorageError> {
        let delta = points_to_i64(delta)?;
        let row = sqlx::query(ADD_POINTS_SQL)
            .bind(PROGRESS_ROW_ID)
            .bind(delta)
            .fetch_one(&self.pool)
            .await
            .map_err(connection)?;

        points_from_i64(row.try_get::<i64, _>("points").map_err(ser)?)
    }

    async fn insert_badge(
        &self,
        name: &str,
        granted_at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let res = sqlx::query(INSERT_BADGE_SQL)
            .bind(name)
            .bind(granted_at)
            .execute(&self.pool)
            .await
            .map_err(connection)?;

        Ok(res.rows_affected() == 1)
    }

    async fn grant_badge_with_bonus(
        &self,
        name: &str,
        bonus: u64,
        granted_at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let bonus = points_to_i64(bonus)?;
        let mut tx = self.pool.begin().await.map_err(connection)?;

        let res = sqlx::query(INSERT_BADGE_SQL)
            .bind(name)
            .bind(granted_at)
            .execute(&mut *tx)
            .await
            .map_err(connection)?;
        if res.rows_affected() == 0 {
            tx.rollback().await.map_err(connection)?;
            return Ok(false);
        }

        if bonus > 0 {
            sqlx::query(ADD_POINTS_SQL)
                .bind(PROGRESS_ROW_ID)
                .bind(bonus)
                .fetch_one(&mut *tx)
                .await
                .map_err(connection)?;
        }

        tx.commit().await.map_err(connection)?;
        Ok(true)
    }
}
