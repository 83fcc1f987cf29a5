use crate::application::ports::{PendingStore, RecordGateway, ReferenceGateway, TourGateway};
use crate::application::services::mode_controller::ModeController;
use crate::application::services::session_bootstrapper::SessionBootstrapper;
use crate::application::services::synchronizer::Synchronizer;
use crate::domain::entities::{
    EmployeeDetails, PendingRecord, PendingRecordDraft, SessionSnapshot, SyncRunSummary, Tour,
};
use crate::domain::value_objects::{
    NaturalKey, PendingRecordId, RecordCategory, RecordPayload, SyncState,
};
use crate::shared::error::AppError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Whether a recorded observation went straight to the remote API or was
/// queued for a later sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordOutcome {
    pub synced: bool,
}

#[derive(Debug, Clone)]
struct ActiveSession {
    tour: Tour,
    #[allow(dead_code)]
    employee: EmployeeDetails,
}

/// Facade over the offline capture core: everything the presentation layer
/// consumes. A failure path here either queues the observation locally or
/// reports the error — a user-entered observation is never silently
/// dropped.
pub struct InspectionService {
    store: Arc<dyn PendingStore>,
    mode: Arc<ModeController>,
    synchronizer: Arc<Synchronizer>,
    bootstrapper: Arc<SessionBootstrapper>,
    tours: Arc<dyn TourGateway>,
    reference: Arc<dyn ReferenceGateway>,
    gateways: HashMap<RecordCategory, Arc<dyn RecordGateway>>,
    snapshot_ttl_hours: i64,
    session: RwLock<Option<ActiveSession>>,
}

impl InspectionService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn PendingStore>,
        mode: Arc<ModeController>,
        synchronizer: Arc<Synchronizer>,
        bootstrapper: Arc<SessionBootstrapper>,
        tours: Arc<dyn TourGateway>,
        reference: Arc<dyn ReferenceGateway>,
        gateways: Vec<Arc<dyn RecordGateway>>,
        snapshot_ttl_hours: i64,
    ) -> Self {
        let gateways = gateways
            .into_iter()
            .map(|gateway| (gateway.category(), gateway))
            .collect();
        Self {
            store,
            mode,
            synchronizer,
            bootstrapper,
            tours,
            reference,
            gateways,
            snapshot_ttl_hours,
            session: RwLock::new(None),
        }
    }

    /// Online entry point: resolve the inspector and create or resume the
    /// department's in-progress tour.
    pub async fn begin_tour(&self, user_id: &str) -> Result<Tour, AppError> {
        let employee = self.reference.resolve_employee(user_id).await?;
        let tour = self
            .tours
            .create_or_resume(&employee.plant, &employee.department)
            .await?;
        *self.session.write().await = Some(ActiveSession {
            tour: tour.clone(),
            employee,
        });
        Ok(tour)
    }

    /// Explicit user action; requires live connectivity to fetch the
    /// offline snapshot, then flips to offline-active.
    pub async fn start_offline_session(&self, user_id: &str) -> Result<(), AppError> {
        let outcome = self.bootstrapper.start_offline_session(user_id).await?;
        *self.session.write().await = Some(ActiveSession {
            tour: outcome.tour,
            employee: outcome.snapshot.employee,
        });
        Ok(())
    }

    /// Record one observation. Online and healthy: straight to the remote
    /// gateway. Offline, degraded, or hit by a network failure: queued
    /// durably, with `synced: false` so the UI can badge pending work.
    pub async fn record_observation(
        &self,
        category: RecordCategory,
        natural_key: NaturalKey,
        payload: RecordPayload,
    ) -> Result<RecordOutcome, AppError> {
        let tour_id = {
            let session = self.session.read().await;
            let Some(active) = session.as_ref() else {
                return Err(AppError::InvalidInput(
                    "No active tour; begin a tour or start an offline session first".to_string(),
                ));
            };
            active.tour.tour_id.clone()
        };

        if self.mode.is_category_offline(category).await {
            let draft = PendingRecordDraft::new(tour_id, category, natural_key, payload);
            self.store.upsert_pending_record(draft).await?;
            return Ok(RecordOutcome { synced: false });
        }

        let Some(gateway) = self.gateways.get(&category) else {
            return Err(AppError::Internal(format!(
                "no gateway registered for {category}"
            )));
        };

        let record = PendingRecord {
            id: PendingRecordId::generate(),
            tour_id: tour_id.clone(),
            category,
            natural_key: natural_key.clone(),
            payload: payload.clone(),
            sync_state: SyncState::Pending,
            created_at: Utc::now(),
            error_message: None,
        };

        match gateway.send(&record).await {
            Ok(_) => Ok(RecordOutcome { synced: true }),
            Err(err) if err.is_retryable() => {
                // Silent degrade-to-offline: the write is queued and the
                // category stays offline until a clean sync.
                tracing::warn!(
                    target: "gemba::capture",
                    %category,
                    error = %err,
                    "live write failed, queuing offline"
                );
                self.mode.degrade_category(category).await;
                let draft = PendingRecordDraft::new(tour_id, category, natural_key, payload);
                self.store.upsert_pending_record(draft).await?;
                Ok(RecordOutcome { synced: false })
            }
            Err(err) => Err(err),
        }
    }

    /// Drain every tour's queue. Offline state (mode flag and degraded
    /// categories) only clears when every tour and every category-specific
    /// queue reports zero failures.
    pub async fn sync_all(&self) -> Result<SyncRunSummary, AppError> {
        let summary = self.synchronizer.sync_all().await?;

        for category in RecordCategory::ALL {
            if self.store.pending_count_for_category(category).await? == 0 {
                self.mode.restore_category(category).await;
            }
        }

        if summary.is_clean() && self.mode.is_offline_active().await {
            self.mode.complete_offline().await?;
        }
        Ok(summary)
    }

    /// Stop an in-flight sync run before its next record.
    pub fn cancel_sync(&self) {
        self.synchronizer.cancel();
    }

    pub async fn pending_count(&self) -> Result<u32, AppError> {
        self.store.pending_count().await
    }

    pub async fn pending_count_for_category(
        &self,
        category: RecordCategory,
    ) -> Result<u32, AppError> {
        self.store.pending_count_for_category(category).await
    }

    pub async fn is_offline_active(&self) -> bool {
        self.mode.is_offline_active().await
    }

    pub async fn current_tour(&self) -> Option<Tour> {
        self.session.read().await.as_ref().map(|s| s.tour.clone())
    }

    /// The active tour's cached snapshot, if one exists and is still within
    /// its 24-hour freshness window.
    pub async fn cached_snapshot(&self) -> Result<Option<SessionSnapshot>, AppError> {
        let Some(tour) = self.current_tour().await else {
            return Ok(None);
        };
        let Some(snapshot) = self.store.load_snapshot(&tour.tour_id).await? else {
            return Ok(None);
        };
        if snapshot.is_stale(Utc::now(), self.snapshot_ttl_hours) {
            tracing::warn!(target: "gemba::capture", tour_id = %tour.tour_id, "snapshot is stale");
            return Ok(None);
        }
        Ok(Some(snapshot))
    }

    /// Mark the active tour finished. The remote row is updated and the
    /// local completed flag set; pending records stay until a clean sync.
    pub async fn finish_tour(&self, score: Option<f64>) -> Result<(), AppError> {
        let mut session = self.session.write().await;
        let Some(active) = session.as_mut() else {
            return Err(AppError::InvalidInput("No active tour".to_string()));
        };
        self.tours.finish(&active.tour.tour_id, score).await?;
        self.store.mark_tour_completed(&active.tour.tour_id).await?;
        active.tour.complete(score, Utc::now());
        Ok(())
    }
}
