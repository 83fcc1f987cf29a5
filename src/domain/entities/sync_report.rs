use crate::domain::value_objects::{NaturalKey, RecordCategory, TourId};
use serde::{Deserialize, Serialize};

/// One failed record in a sync run, with the gateway's error message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncError {
    pub category: RecordCategory,
    pub natural_key: NaturalKey,
    pub message: String,
}

/// Per-tour outcome of a sync run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TourSyncReport {
    pub tour_id: TourId,
    pub synced_count: u32,
    pub failed_count: u32,
    pub errors: Vec<SyncError>,
}

impl TourSyncReport {
    pub fn new(tour_id: TourId) -> Self {
        Self {
            tour_id,
            synced_count: 0,
            failed_count: 0,
            errors: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed_count == 0
    }
}

/// Aggregate over all tours; offline state only clears when every tour
/// reports zero failures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SyncRunSummary {
    pub reports: Vec<TourSyncReport>,
}

impl SyncRunSummary {
    pub fn is_clean(&self) -> bool {
        self.reports.iter().all(TourSyncReport::is_clean)
    }

    pub fn total_synced(&self) -> u32 {
        self.reports.iter().map(|r| r.synced_count).sum()
    }

    pub fn total_failed(&self) -> u32 {
        self.reports.iter().map(|r| r.failed_count).sum()
    }
}
