use crate::domain::entities::{PendingRecord, PendingRecordDraft, SessionSnapshot, TourBacklog};
use crate::domain::value_objects::{NaturalKey, RecordCategory, TourId};
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Durable local store for the offline queue. Survives restarts; one
/// logical container per tour, mutated atomically.
#[async_trait]
pub trait PendingStore: Send + Sync {
    /// Insert or replace the unique record for (tour, category, natural
    /// key). On a quota failure the implementation runs a stale-tour
    /// cleanup pass and retries once; a write that still fails must surface
    /// `AppError::StorageQuota` so the caller never believes unsaved data
    /// was captured.
    async fn upsert_pending_record(
        &self,
        draft: PendingRecordDraft,
    ) -> Result<PendingRecord, AppError>;

    /// Idempotent delete; absent records are not an error.
    async fn remove_pending_record(
        &self,
        tour_id: &TourId,
        category: RecordCategory,
        natural_key: &NaturalKey,
    ) -> Result<(), AppError>;

    /// Record a transient failure for UI display without dequeuing.
    async fn mark_record_failed(
        &self,
        tour_id: &TourId,
        category: RecordCategory,
        natural_key: &NaturalKey,
        message: &str,
    ) -> Result<(), AppError>;

    /// All pending records grouped by tour, for every tour with at least
    /// one entry. Pure read.
    async fn list_pending_for_sync(&self) -> Result<Vec<TourBacklog>, AppError>;

    async fn pending_count(&self) -> Result<u32, AppError>;

    async fn pending_count_for_category(
        &self,
        category: RecordCategory,
    ) -> Result<u32, AppError>;

    async fn save_snapshot(
        &self,
        tour_id: &TourId,
        snapshot: &SessionSnapshot,
    ) -> Result<(), AppError>;

    async fn load_snapshot(&self, tour_id: &TourId) -> Result<Option<SessionSnapshot>, AppError>;

    /// Completed flag is a UI filter only; clearing the queue stays with
    /// the synchronizer.
    async fn mark_tour_completed(&self, tour_id: &TourId) -> Result<(), AppError>;

    /// Drop a tour's container entirely (queue and snapshot).
    async fn clear_tour(&self, tour_id: &TourId) -> Result<(), AppError>;

    /// Evict tours whose last update is older than the retention window.
    /// Returns the number of tours removed.
    async fn evict_stale_tours(&self, retention_days: i64) -> Result<u32, AppError>;
}
