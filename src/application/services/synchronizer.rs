use crate::application::ports::{PendingStore, RecordGateway};
use crate::domain::entities::{PendingRecord, SyncError, SyncRunSummary, TourSyncReport};
use crate::domain::value_objects::{RecordCategory, SyncState};
use crate::shared::error::AppError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Drains the durable queue against the remote gateways, category by
/// category. One bad record never blocks the rest; a tour's container is
/// only cleared once every record in it synced without error.
pub struct Synchronizer {
    store: Arc<dyn PendingStore>,
    gateways: HashMap<RecordCategory, Arc<dyn RecordGateway>>,
    cancelled: AtomicBool,
}

impl Synchronizer {
    pub fn new(
        store: Arc<dyn PendingStore>,
        gateways: Vec<Arc<dyn RecordGateway>>,
    ) -> Self {
        let gateways = gateways
            .into_iter()
            .map(|gateway| (gateway.category(), gateway))
            .collect();
        Self {
            store,
            gateways,
            cancelled: AtomicBool::new(false),
        }
    }

    /// Request that the run stops before the next record. A network call
    /// already in flight is never interrupted.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Drain everything queued at the moment the run starts. Records added
    /// mid-run wait for the next invocation.
    pub async fn sync_all(&self) -> Result<SyncRunSummary, AppError> {
        self.cancelled.store(false, Ordering::Relaxed);

        let backlog = self.store.list_pending_for_sync().await?;
        tracing::info!(
            target: "gemba::sync",
            tours = backlog.len(),
            "sync run started"
        );

        let mut summary = SyncRunSummary::default();
        for tour in backlog {
            let mut report = TourSyncReport::new(tour.tour_id.clone());
            let batch = collapse_by_natural_key(tour.records);

            for record in batch {
                if self.cancelled.load(Ordering::Relaxed) {
                    tracing::info!(target: "gemba::sync", "sync run cancelled between records");
                    summary.reports.push(report);
                    return Ok(summary);
                }
                self.replay_record(record, &mut report).await;
            }

            if report.is_clean() {
                self.store.clear_tour(&report.tour_id).await?;
            }
            tracing::info!(
                target: "gemba::sync",
                tour_id = %report.tour_id,
                synced = report.synced_count,
                failed = report.failed_count,
                "tour drained"
            );
            summary.reports.push(report);
        }

        tracing::info!(
            target: "gemba::sync",
            synced = summary.total_synced(),
            failed = summary.total_failed(),
            "sync run finished"
        );
        Ok(summary)
    }

    async fn replay_record(&self, record: PendingRecord, report: &mut TourSyncReport) {
        // A record already flagged failed is waiting on user correction; it
        // still blocks tour cleanup but is not replayed.
        if record.sync_state == SyncState::Failed {
            report.failed_count += 1;
            report.errors.push(SyncError {
                category: record.category,
                natural_key: record.natural_key.clone(),
                message: record
                    .error_message
                    .clone()
                    .unwrap_or_else(|| "awaiting correction".to_string()),
            });
            return;
        }

        let Some(gateway) = self.gateways.get(&record.category) else {
            report.failed_count += 1;
            report.errors.push(SyncError {
                category: record.category,
                natural_key: record.natural_key.clone(),
                message: format!("no gateway registered for {}", record.category),
            });
            return;
        };

        match gateway.send(&record).await {
            Ok(remote_id) => {
                tracing::debug!(
                    target: "gemba::sync",
                    category = %record.category,
                    natural_key = %record.natural_key,
                    remote_id = %remote_id,
                    "record synced"
                );
                if let Err(err) = self
                    .store
                    .remove_pending_record(&record.tour_id, record.category, &record.natural_key)
                    .await
                {
                    // The remote write landed but the local dequeue failed;
                    // the record will replay and the gateway's natural-key
                    // lookup absorbs the duplicate.
                    report.failed_count += 1;
                    report.errors.push(SyncError {
                        category: record.category,
                        natural_key: record.natural_key.clone(),
                        message: err.to_string(),
                    });
                    return;
                }
                report.synced_count += 1;
            }
            Err(err) => {
                report.failed_count += 1;
                report.errors.push(SyncError {
                    category: record.category,
                    natural_key: record.natural_key.clone(),
                    message: err.to_string(),
                });
                if err.requires_correction() {
                    if let Err(mark_err) = self
                        .store
                        .mark_record_failed(
                            &record.tour_id,
                            record.category,
                            &record.natural_key,
                            &err.to_string(),
                        )
                        .await
                    {
                        tracing::warn!(
                            target: "gemba::sync",
                            error = %mark_err,
                            "could not persist failed state"
                        );
                    }
                }
            }
        }
    }
}

/// Defensive dedupe before replay: within one category, only the newest
/// record per natural key survives, and replay proceeds in creation order
/// so last-write-wins is preserved for order-sensitive remotes. Categories
/// stay independent.
fn collapse_by_natural_key(records: Vec<PendingRecord>) -> Vec<PendingRecord> {
    let mut newest: HashMap<(RecordCategory, String), PendingRecord> = HashMap::new();
    for record in records {
        let key = (record.category, record.natural_key.as_str().to_string());
        match newest.get(&key) {
            Some(existing) if existing.created_at >= record.created_at => {}
            _ => {
                newest.insert(key, record);
            }
        }
    }
    let mut batch: Vec<PendingRecord> = newest.into_values().collect();
    batch.sort_by(|a, b| {
        a.category
            .as_str()
            .cmp(b.category.as_str())
            .then(a.created_at.cmp(&b.created_at))
    });
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{
        NaturalKey, PendingRecordId, RecordPayload, TourId,
    };
    use chrono::{Duration, Utc};

    fn record(key: &str, offset_secs: i64, payload: &str) -> PendingRecord {
        PendingRecord {
            id: PendingRecordId::generate(),
            tour_id: TourId::new("t-1".into()).unwrap(),
            category: RecordCategory::ChecklistObservation,
            natural_key: NaturalKey::new(key.into()).unwrap(),
            payload: RecordPayload::from_json_str(payload).unwrap(),
            sync_state: SyncState::Pending,
            created_at: Utc::now() + Duration::seconds(offset_secs),
            error_message: None,
        }
    }

    #[test]
    fn collapse_keeps_newest_per_key() {
        let batch = collapse_by_natural_key(vec![
            record("section:c-1", 0, r#"{"v":"old"}"#),
            record("section:c-1", 10, r#"{"v":"new"}"#),
            record("section:c-2", 5, r#"{"v":"other"}"#),
        ]);
        assert_eq!(batch.len(), 2);
        let kept = batch
            .iter()
            .find(|r| r.natural_key.as_str() == "section:c-1")
            .unwrap();
        assert_eq!(kept.payload.as_json()["v"], "new");
    }

    #[test]
    fn collapse_orders_by_creation_within_category() {
        let batch = collapse_by_natural_key(vec![
            record("section:c-3", 30, "{}"),
            record("section:c-1", 10, "{}"),
            record("section:c-2", 20, "{}"),
        ]);
        let keys: Vec<&str> = batch.iter().map(|r| r.natural_key.as_str()).collect();
        assert_eq!(keys, vec!["section:c-1", "section:c-2", "section:c-3"]);
    }
}
