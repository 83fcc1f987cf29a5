use crate::application::ports::TourGateway;
use crate::domain::entities::{Tour, TourStatus};
use crate::domain::value_objects::TourId;
use crate::infrastructure::remote::api_client::{extract_remote_id, ApiClient};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;

/// Tour lifecycle adapter. Create-or-resume queries for the department's
/// in-progress tour before creating, so two devices never split one
/// walkthrough into two tours.
pub struct HttpTourGateway {
    api: Arc<ApiClient>,
}

impl HttpTourGateway {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    fn decode_tour(value: &Value, plant: &str, department: &str) -> Result<Tour, AppError> {
        let tour_id = extract_remote_id(value, "tourId")?;
        let started_at = match value.get("startedAt").and_then(Value::as_str) {
            Some(raw) => DateTime::parse_from_rfc3339(raw)
                .map_err(|err| {
                    AppError::DeserializationError(format!("Invalid startedAt `{raw}`: {err}"))
                })?
                .with_timezone(&Utc),
            None => Utc::now(),
        };
        let status = value
            .get("status")
            .and_then(Value::as_str)
            .map(TourStatus::from)
            .unwrap_or(TourStatus::InProgress);

        let mut tour = Tour::new(
            TourId::new(tour_id.as_str().to_string()).map_err(AppError::DeserializationError)?,
            plant.to_string(),
            department.to_string(),
            started_at,
        );
        tour.status = status;
        tour.score = value.get("score").and_then(Value::as_f64);
        Ok(tour)
    }
}

#[async_trait]
impl TourGateway for HttpTourGateway {
    async fn create_or_resume(&self, plant: &str, department: &str) -> Result<Tour, AppError> {
        let existing: Value = self
            .api
            .send_json(
                Method::GET,
                "tours",
                &[
                    ("plant", plant.to_string()),
                    ("department", department.to_string()),
                    ("status", "in_progress".to_string()),
                ],
                None,
            )
            .await?;

        if let Some(tour) = existing
            .get("items")
            .and_then(Value::as_array)
            .and_then(|items| items.first())
        {
            tracing::info!(target: "gemba::remote", plant, department, "resuming in-progress tour");
            return Self::decode_tour(tour, plant, department);
        }

        let created: Value = self
            .api
            .send_json(
                Method::POST,
                "tours",
                &[],
                Some(&json!({
                    "plant": plant,
                    "department": department,
                    "startedAt": Utc::now().to_rfc3339(),
                })),
            )
            .await?;
        Self::decode_tour(&created, plant, department)
    }

    async fn finish(&self, tour_id: &TourId, score: Option<f64>) -> Result<(), AppError> {
        let _: Value = self
            .api
            .send_json(
                Method::PATCH,
                &format!("tours/{tour_id}"),
                &[],
                Some(&json!({
                    "status": "completed",
                    "score": score,
                    "completedAt": Utc::now().to_rfc3339(),
                })),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_requires_tour_id() {
        let err = HttpTourGateway::decode_tour(&json!({"status": "in_progress"}), "P01", "Baking")
            .unwrap_err();
        assert!(matches!(err, AppError::DeserializationError(_)));
    }

    #[test]
    fn decode_reads_status_and_score() {
        let tour = HttpTourGateway::decode_tour(
            &json!({
                "tourId": "t-9",
                "status": "in_progress",
                "score": 87.5,
                "startedAt": "2026-08-01T06:30:00Z",
            }),
            "P01",
            "Baking",
        )
        .unwrap();
        assert_eq!(tour.tour_id.as_str(), "t-9");
        assert_eq!(tour.status, TourStatus::InProgress);
        assert_eq!(tour.score, Some(87.5));
    }
}
