use crate::application::ports::PendingStore;
use crate::domain::entities::{PendingRecord, PendingRecordDraft, SessionSnapshot, TourBacklog};
use crate::domain::value_objects::{
    NaturalKey, PendingRecordId, RecordCategory, RecordPayload, SyncState, TourId,
};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use sqlx::{Pool, Row, Sqlite};

/// SQLite-backed durable store for the offline queue. Every mutation runs
/// inside one transaction so an interrupted write can never leave a
/// half-updated container.
pub struct SqlitePendingStore {
    pool: Pool<Sqlite>,
    retention_days: i64,
}

#[derive(sqlx::FromRow)]
struct PendingRecordRow {
    tour_id: String,
    category: String,
    natural_key: String,
    record_id: String,
    payload: String,
    sync_state: String,
    error_message: Option<String>,
    created_at: i64,
}

impl PendingRecordRow {
    fn into_record(self) -> Result<PendingRecord, AppError> {
        Ok(PendingRecord {
            id: PendingRecordId::new(self.record_id).map_err(AppError::Database)?,
            tour_id: TourId::new(self.tour_id).map_err(AppError::Database)?,
            category: RecordCategory::parse(&self.category).map_err(AppError::Database)?,
            natural_key: NaturalKey::new(self.natural_key).map_err(AppError::Database)?,
            payload: RecordPayload::from_json_str(&self.payload).map_err(AppError::Database)?,
            sync_state: SyncState::from(self.sync_state.as_str()),
            created_at: millis_to_datetime(self.created_at)?,
            error_message: self.error_message,
        })
    }
}

fn millis_to_datetime(millis: i64) -> Result<DateTime<Utc>, AppError> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| AppError::Database(format!("Invalid stored timestamp: {millis}")))
}

/// SQLITE_FULL surfaces as "database or disk is full"; treated as the
/// quota signal that triggers the cleanup-and-retry pass.
fn is_quota_error(err: &sqlx::Error) -> bool {
    let message = err.to_string().to_lowercase();
    message.contains("disk is full") || message.contains("sqlite_full")
}

impl SqlitePendingStore {
    pub fn new(pool: Pool<Sqlite>, retention_days: i64) -> Self {
        Self {
            pool,
            retention_days,
        }
    }

    async fn write_record(&self, record: &PendingRecord) -> Result<(), sqlx::Error> {
        let now = Utc::now().timestamp_millis();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO tour_sessions (tour_id, completed, started_at, last_updated)
            VALUES (?1, 0, ?2, ?2)
            ON CONFLICT(tour_id) DO UPDATE SET last_updated = excluded.last_updated
            "#,
        )
        .bind(record.tour_id.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO pending_records (
                tour_id, category, natural_key, record_id,
                payload, sync_state, error_message, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, ?7)
            ON CONFLICT(tour_id, category, natural_key) DO UPDATE SET
                record_id = excluded.record_id,
                payload = excluded.payload,
                sync_state = excluded.sync_state,
                error_message = NULL,
                created_at = excluded.created_at
            "#,
        )
        .bind(record.tour_id.as_str())
        .bind(record.category.as_str())
        .bind(record.natural_key.as_str())
        .bind(record.id.as_str())
        .bind(record.payload.as_json().to_string())
        .bind(record.sync_state.as_str())
        .bind(record.created_at.timestamp_millis())
        .execute(&mut *tx)
        .await?;

        tx.commit().await
    }

    async fn evict_older_than(&self, cutoff_millis: i64) -> Result<u32, AppError> {
        let mut tx = self.pool.begin().await?;

        let rows = sqlx::query("SELECT tour_id FROM tour_sessions WHERE last_updated < ?1")
            .bind(cutoff_millis)
            .fetch_all(&mut *tx)
            .await?;
        let tour_ids: Vec<String> = rows
            .into_iter()
            .map(|row| row.try_get::<String, _>("tour_id"))
            .collect::<Result<_, _>>()?;

        for tour_id in &tour_ids {
            sqlx::query("DELETE FROM pending_records WHERE tour_id = ?1")
                .bind(tour_id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("DELETE FROM session_snapshots WHERE tour_id = ?1")
                .bind(tour_id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("DELETE FROM tour_sessions WHERE tour_id = ?1")
                .bind(tour_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(tour_ids.len() as u32)
    }
}

#[async_trait]
impl PendingStore for SqlitePendingStore {
    async fn upsert_pending_record(
        &self,
        draft: PendingRecordDraft,
    ) -> Result<PendingRecord, AppError> {
        let record = PendingRecord {
            id: PendingRecordId::generate(),
            tour_id: draft.tour_id,
            category: draft.category,
            natural_key: draft.natural_key,
            payload: draft.payload,
            sync_state: SyncState::Pending,
            created_at: Utc::now(),
            error_message: None,
        };

        match self.write_record(&record).await {
            Ok(()) => Ok(record),
            Err(err) if is_quota_error(&err) => {
                tracing::warn!(
                    target: "gemba::store",
                    "storage quota hit, evicting stale tours and retrying"
                );
                self.evict_stale_tours(self.retention_days).await?;
                self.write_record(&record)
                    .await
                    .map_err(|retry_err| AppError::StorageQuota(retry_err.to_string()))?;
                Ok(record)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn remove_pending_record(
        &self,
        tour_id: &TourId,
        category: RecordCategory,
        natural_key: &NaturalKey,
    ) -> Result<(), AppError> {
        sqlx::query(
            "DELETE FROM pending_records WHERE tour_id = ?1 AND category = ?2 AND natural_key = ?3",
        )
        .bind(tour_id.as_str())
        .bind(category.as_str())
        .bind(natural_key.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn mark_record_failed(
        &self,
        tour_id: &TourId,
        category: RecordCategory,
        natural_key: &NaturalKey,
        message: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE pending_records
            SET sync_state = 'failed', error_message = ?4
            WHERE tour_id = ?1 AND category = ?2 AND natural_key = ?3
            "#,
        )
        .bind(tour_id.as_str())
        .bind(category.as_str())
        .bind(natural_key.as_str())
        .bind(message)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_pending_for_sync(&self) -> Result<Vec<TourBacklog>, AppError> {
        let rows = sqlx::query_as::<_, PendingRecordRow>(
            "SELECT * FROM pending_records ORDER BY tour_id, created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut backlogs: Vec<TourBacklog> = Vec::new();
        for row in rows {
            let record = row.into_record()?;
            match backlogs.last_mut() {
                Some(backlog) if backlog.tour_id == record.tour_id => {
                    backlog.records.push(record);
                }
                _ => backlogs.push(TourBacklog {
                    tour_id: record.tour_id.clone(),
                    records: vec![record],
                }),
            }
        }
        Ok(backlogs)
    }

    async fn pending_count(&self) -> Result<u32, AppError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pending_records")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u32)
    }

    async fn pending_count_for_category(
        &self,
        category: RecordCategory,
    ) -> Result<u32, AppError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM pending_records WHERE category = ?1")
                .bind(category.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(count as u32)
    }

    async fn save_snapshot(
        &self,
        tour_id: &TourId,
        snapshot: &SessionSnapshot,
    ) -> Result<(), AppError> {
        let criteria = serde_json::to_string(&snapshot.criteria)?;
        let employee = serde_json::to_string(&snapshot.employee)?;
        let observations = serde_json::to_string(&snapshot.existing_observations)?;
        let now = Utc::now().timestamp_millis();

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO tour_sessions (tour_id, completed, started_at, last_updated)
            VALUES (?1, 0, ?2, ?2)
            ON CONFLICT(tour_id) DO UPDATE SET last_updated = excluded.last_updated
            "#,
        )
        .bind(tour_id.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO session_snapshots (
                tour_id, criteria, employee, existing_observations, fetched_at
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(tour_id) DO UPDATE SET
                criteria = excluded.criteria,
                employee = excluded.employee,
                existing_observations = excluded.existing_observations,
                fetched_at = excluded.fetched_at
            "#,
        )
        .bind(tour_id.as_str())
        .bind(&criteria)
        .bind(&employee)
        .bind(&observations)
        .bind(snapshot.fetched_at.timestamp_millis())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn load_snapshot(&self, tour_id: &TourId) -> Result<Option<SessionSnapshot>, AppError> {
        let row = sqlx::query(
            r#"
            SELECT criteria, employee, existing_observations, fetched_at
            FROM session_snapshots
            WHERE tour_id = ?1
            "#,
        )
        .bind(tour_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let criteria: String = row.try_get("criteria")?;
        let employee: String = row.try_get("employee")?;
        let observations: String = row.try_get("existing_observations")?;
        let fetched_at: i64 = row.try_get("fetched_at")?;

        Ok(Some(SessionSnapshot {
            criteria: serde_json::from_str(&criteria)
                .map_err(|e| AppError::DeserializationError(e.to_string()))?,
            employee: serde_json::from_str(&employee)
                .map_err(|e| AppError::DeserializationError(e.to_string()))?,
            existing_observations: serde_json::from_str(&observations)
                .map_err(|e| AppError::DeserializationError(e.to_string()))?,
            fetched_at: millis_to_datetime(fetched_at)?,
        }))
    }

    async fn mark_tour_completed(&self, tour_id: &TourId) -> Result<(), AppError> {
        let now = Utc::now().timestamp_millis();
        sqlx::query(
            r#"
            INSERT INTO tour_sessions (tour_id, completed, started_at, last_updated)
            VALUES (?1, 1, ?2, ?2)
            ON CONFLICT(tour_id) DO UPDATE SET
                completed = 1,
                last_updated = excluded.last_updated
            "#,
        )
        .bind(tour_id.as_str())
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn clear_tour(&self, tour_id: &TourId) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM pending_records WHERE tour_id = ?1")
            .bind(tour_id.as_str())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM session_snapshots WHERE tour_id = ?1")
            .bind(tour_id.as_str())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM tour_sessions WHERE tour_id = ?1")
            .bind(tour_id.as_str())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn evict_stale_tours(&self, retention_days: i64) -> Result<u32, AppError> {
        let cutoff = (Utc::now() - Duration::days(retention_days)).timestamp_millis();
        let removed = self.evict_older_than(cutoff).await?;
        if removed > 0 {
            tracing::info!(target: "gemba::store", removed, "evicted stale tours");
        }
        Ok(removed)
    }
}
