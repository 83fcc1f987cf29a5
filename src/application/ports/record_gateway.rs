use crate::domain::entities::{PendingRecord, RemoteObservation, Tour};
use crate::domain::value_objects::{NaturalKey, RecordCategory, RemoteId, TourId};
use crate::shared::error::AppError;
use async_trait::async_trait;

/// One adapter per record category. `send` must be idempotent with respect
/// to the natural key: look up an existing remote row first and update it
/// rather than creating a duplicate. Retries are the synchronizer's job,
/// not the gateway's.
#[async_trait]
pub trait RecordGateway: Send + Sync {
    fn category(&self) -> RecordCategory;

    async fn send(&self, record: &PendingRecord) -> Result<RemoteId, AppError>;

    async fn query(
        &self,
        tour_id: &TourId,
        natural_key: &NaturalKey,
    ) -> Result<Option<RemoteId>, AppError>;

    async fn delete(&self, remote_id: &RemoteId) -> Result<(), AppError>;
}

/// Tour lifecycle against the remote system.
#[async_trait]
pub trait TourGateway: Send + Sync {
    /// Returns the in-progress tour for the department if one exists,
    /// otherwise creates a new one.
    async fn create_or_resume(&self, plant: &str, department: &str) -> Result<Tour, AppError>;

    async fn finish(&self, tour_id: &TourId, score: Option<f64>) -> Result<(), AppError>;
}

/// Reference data needed to work offline.
#[async_trait]
pub trait ReferenceGateway: Send + Sync {
    async fn resolve_employee(
        &self,
        user_id: &str,
    ) -> Result<crate::domain::entities::EmployeeDetails, AppError>;

    /// Criteria filtered by plant and department but never by area: all
    /// areas must be cached so offline navigation across sections works.
    async fn list_criteria(
        &self,
        plant: &str,
        department: &str,
    ) -> Result<Vec<crate::domain::entities::Criterion>, AppError>;

    async fn list_observations(
        &self,
        tour_id: &TourId,
    ) -> Result<Vec<RemoteObservation>, AppError>;
}
