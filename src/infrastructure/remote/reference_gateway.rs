use crate::application::ports::ReferenceGateway;
use crate::domain::entities::{Criterion, EmployeeDetails, RemoteObservation};
use crate::domain::value_objects::{NaturalKey, RemoteId, TourId};
use crate::infrastructure::remote::api_client::ApiClient;
use crate::shared::error::AppError;
use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmployeeWire {
    employee_id: String,
    name: String,
    role: String,
    plant: String,
    department: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CriterionWire {
    id: String,
    area: String,
    category: String,
    what_text: String,
    criteria_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObservationWire {
    observation_id: String,
    criterion_id: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct ItemsWire<T> {
    items: Vec<T>,
}

/// Reference data and identity lookups used by the session bootstrapper.
pub struct HttpReferenceGateway {
    api: Arc<ApiClient>,
}

impl HttpReferenceGateway {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ReferenceGateway for HttpReferenceGateway {
    async fn resolve_employee(&self, user_id: &str) -> Result<EmployeeDetails, AppError> {
        let wire: EmployeeWire = self
            .api
            .send_json(
                Method::GET,
                &format!("employees/{user_id}"),
                &[],
                None,
            )
            .await?;
        Ok(EmployeeDetails {
            employee_id: wire.employee_id,
            name: wire.name,
            role: wire.role,
            plant: wire.plant,
            department: wire.department,
        })
    }

    async fn list_criteria(
        &self,
        plant: &str,
        department: &str,
    ) -> Result<Vec<Criterion>, AppError> {
        // Filtered by plant and department only; every area is returned so
        // the cached list covers offline navigation across sections.
        let wire: ItemsWire<CriterionWire> = self
            .api
            .send_json(
                Method::GET,
                "criteria",
                &[
                    ("plant", plant.to_string()),
                    ("department", department.to_string()),
                ],
                None,
            )
            .await?;
        Ok(wire
            .items
            .into_iter()
            .map(|c| Criterion {
                id: c.id,
                area: c.area,
                category: c.category,
                what_text: c.what_text,
                criteria_text: c.criteria_text,
            })
            .collect())
    }

    async fn list_observations(
        &self,
        tour_id: &TourId,
    ) -> Result<Vec<RemoteObservation>, AppError> {
        let wire: ItemsWire<ObservationWire> = self
            .api
            .send_json(
                Method::GET,
                "observations",
                &[("tourId", tour_id.to_string())],
                None,
            )
            .await?;
        wire.items
            .into_iter()
            .map(|o| {
                Ok(RemoteObservation {
                    remote_id: RemoteId::new(o.observation_id)
                        .map_err(AppError::DeserializationError)?,
                    natural_key: NaturalKey::criterion(&o.criterion_id),
                    status: o.status,
                })
            })
            .collect()
    }
}
