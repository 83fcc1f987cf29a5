use crate::application::ports::{
    AuthProvider, ConnectivityProbe, PendingStore, ReferenceGateway, TourGateway,
};
use crate::application::services::mode_controller::ModeController;
use crate::domain::entities::{SessionSnapshot, Tour};
use crate::shared::error::AppError;
use chrono::Utc;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct BootstrapOutcome {
    pub tour: Tour,
    pub snapshot: SessionSnapshot,
}

/// Arms offline mode: fetches everything the UI will need while offline in
/// one pass. Auth, identity and tour resolution are mandatory — a failure
/// there aborts the whole bootstrap and the session stays fully online.
/// Reference fetches are tolerated degraded with empty lists.
pub struct SessionBootstrapper {
    auth: Arc<dyn AuthProvider>,
    tours: Arc<dyn TourGateway>,
    reference: Arc<dyn ReferenceGateway>,
    store: Arc<dyn PendingStore>,
    connectivity: Arc<dyn ConnectivityProbe>,
    mode: Arc<ModeController>,
}

impl SessionBootstrapper {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        tours: Arc<dyn TourGateway>,
        reference: Arc<dyn ReferenceGateway>,
        store: Arc<dyn PendingStore>,
        connectivity: Arc<dyn ConnectivityProbe>,
        mode: Arc<ModeController>,
    ) -> Self {
        Self {
            auth,
            tours,
            reference,
            store,
            connectivity,
            mode,
        }
    }

    /// The explicit "start offline session" user action. Fails fast when
    /// the network is down at the moment of the request — the only
    /// operation allowed to require connectivity while going offline.
    pub async fn start_offline_session(&self, user_id: &str) -> Result<BootstrapOutcome, AppError> {
        if !self.connectivity.is_online().await {
            return Err(AppError::Network(
                "Starting an offline session requires connectivity".to_string(),
            ));
        }

        self.mode.arm_offline().await?;
        match self.bootstrap(user_id).await {
            Ok(outcome) => {
                self.mode.activate_offline().await?;
                Ok(outcome)
            }
            Err(err) => {
                self.mode.abort_arming().await;
                Err(err)
            }
        }
    }

    async fn bootstrap(&self, user_id: &str) -> Result<BootstrapOutcome, AppError> {
        tracing::info!(target: "gemba::bootstrap", user_id, "offline bootstrap started");

        self.auth.access_token().await?;

        let employee = self.reference.resolve_employee(user_id).await?;
        let tour = self
            .tours
            .create_or_resume(&employee.plant, &employee.department)
            .await?;

        // Criteria are cached for every area, never filtered down, so
        // offline navigation across sections keeps working.
        let criteria = match self
            .reference
            .list_criteria(&employee.plant, &employee.department)
            .await
        {
            Ok(criteria) => criteria,
            Err(err) => {
                tracing::warn!(
                    target: "gemba::bootstrap",
                    error = %err,
                    "criteria fetch failed, continuing with empty list"
                );
                Vec::new()
            }
        };

        let existing_observations = match self.reference.list_observations(&tour.tour_id).await {
            Ok(observations) => observations,
            Err(err) => {
                tracing::warn!(
                    target: "gemba::bootstrap",
                    error = %err,
                    "observation fetch failed, continuing with empty list"
                );
                Vec::new()
            }
        };

        let snapshot = SessionSnapshot {
            criteria,
            employee,
            existing_observations,
            fetched_at: Utc::now(),
        };
        self.store.save_snapshot(&tour.tour_id, &snapshot).await?;

        tracing::info!(
            target: "gemba::bootstrap",
            tour_id = %tour.tour_id,
            criteria = snapshot.criteria.len(),
            observations = snapshot.existing_observations.len(),
            "offline bootstrap complete"
        );
        Ok(BootstrapOutcome { tour, snapshot })
    }
}
