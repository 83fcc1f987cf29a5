use crate::application::ports::RecordGateway;
use crate::domain::entities::PendingRecord;
use crate::domain::value_objects::{NaturalKey, RecordCategory, RemoteId, TourId};
use crate::infrastructure::remote::api_client::{extract_remote_id, ApiClient};
use crate::shared::error::AppError;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;

const ID_FIELD: &str = "observationId";

/// Checklist and not-applicable observations share the observations
/// endpoint; the natural-key lookup before create keeps a re-synced
/// observation on the same remote row.
pub struct HttpObservationGateway {
    api: Arc<ApiClient>,
    category: RecordCategory,
}

impl HttpObservationGateway {
    pub fn checklist(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            category: RecordCategory::ChecklistObservation,
        }
    }

    pub fn not_applicable(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            category: RecordCategory::NotApplicableObservation,
        }
    }

    fn wire_body(record: &PendingRecord) -> Result<Value, AppError> {
        let mut body = record.payload.as_json().clone();
        let Some(map) = body.as_object_mut() else {
            return Err(AppError::ValidationError(
                "Observation payload must be a JSON object".to_string(),
            ));
        };
        map.insert("tourId".into(), Value::String(record.tour_id.to_string()));
        map.insert(
            "naturalKey".into(),
            Value::String(record.natural_key.to_string()),
        );
        Ok(body)
    }
}

#[async_trait]
impl RecordGateway for HttpObservationGateway {
    fn category(&self) -> RecordCategory {
        self.category
    }

    async fn send(&self, record: &PendingRecord) -> Result<RemoteId, AppError> {
        let body = Self::wire_body(record)?;
        if let Some(existing) = self.query(&record.tour_id, &record.natural_key).await? {
            let _: Value = self
                .api
                .send_json(
                    Method::PUT,
                    &format!("observations/{existing}"),
                    &[],
                    Some(&body),
                )
                .await?;
            return Ok(existing);
        }

        let created: Value = self
            .api
            .send_json(Method::POST, "observations", &[], Some(&body))
            .await?;
        extract_remote_id(&created, ID_FIELD)
    }

    async fn query(
        &self,
        tour_id: &TourId,
        natural_key: &NaturalKey,
    ) -> Result<Option<RemoteId>, AppError> {
        let response: Value = self
            .api
            .send_json(
                Method::GET,
                "observations",
                &[
                    ("tourId", tour_id.to_string()),
                    ("naturalKey", natural_key.to_string()),
                ],
                None,
            )
            .await?;
        match response
            .get("items")
            .and_then(Value::as_array)
            .and_then(|items| items.first())
        {
            Some(item) => extract_remote_id(item, ID_FIELD).map(Some),
            None => Ok(None),
        }
    }

    async fn delete(&self, remote_id: &RemoteId) -> Result<(), AppError> {
        let _: Value = self
            .api
            .send_json(
                Method::DELETE,
                &format!("observations/{remote_id}"),
                &[],
                None,
            )
            .await?;
        Ok(())
    }
}
