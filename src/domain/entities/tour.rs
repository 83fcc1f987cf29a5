use crate::domain::value_objects::TourId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TourStatus {
    InProgress,
    Completed,
}

impl TourStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TourStatus::InProgress => "in_progress",
            TourStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TourStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for TourStatus {
    fn from(value: &str) -> Self {
        match value {
            "completed" => TourStatus::Completed,
            _ => TourStatus::InProgress,
        }
    }
}

/// One inspection walkthrough, scoped to a plant department. Created (or
/// resumed) server-side; never deleted, only marked completed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tour {
    pub tour_id: TourId,
    pub plant: String,
    pub department: String,
    pub status: TourStatus,
    pub score: Option<f64>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Tour {
    pub fn new(
        tour_id: TourId,
        plant: String,
        department: String,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            tour_id,
            plant,
            department,
            status: TourStatus::InProgress,
            score: None,
            started_at,
            completed_at: None,
        }
    }

    pub fn complete(&mut self, score: Option<f64>, completed_at: DateTime<Utc>) {
        self.status = TourStatus::Completed;
        self.score = score;
        self.completed_at = Some(completed_at);
    }

    pub fn is_completed(&self) -> bool {
        self.status == TourStatus::Completed
    }
}
