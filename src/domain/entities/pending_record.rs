use crate::domain::value_objects::{
    NaturalKey, PendingRecordId, RecordCategory, RecordPayload, SyncState, TourId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The unit of offline work: one queued write against the remote API,
/// unique per (tour, category, natural key). A later write for the same key
/// replaces the earlier unsynced one instead of duplicating it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingRecord {
    pub id: PendingRecordId,
    pub tour_id: TourId,
    pub category: RecordCategory,
    pub natural_key: NaturalKey,
    pub payload: RecordPayload,
    pub sync_state: SyncState,
    pub created_at: DateTime<Utc>,
    pub error_message: Option<String>,
}

impl PendingRecord {
    pub fn mark_failed(&mut self, message: String) {
        self.sync_state = SyncState::Failed;
        self.error_message = Some(message);
    }
}

/// Draft used when queuing a new write; id, state and timestamp are
/// assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingRecordDraft {
    pub tour_id: TourId,
    pub category: RecordCategory,
    pub natural_key: NaturalKey,
    pub payload: RecordPayload,
}

impl PendingRecordDraft {
    pub fn new(
        tour_id: TourId,
        category: RecordCategory,
        natural_key: NaturalKey,
        payload: RecordPayload,
    ) -> Self {
        Self {
            tour_id,
            category,
            natural_key,
            payload,
        }
    }
}

/// All pending work for one tour, as returned by the store for a sync run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TourBacklog {
    pub tour_id: TourId,
    pub records: Vec<PendingRecord>,
}
