use crate::domain::value_objects::{NaturalKey, RemoteId};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One inspection criterion from the reference data API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Criterion {
    pub id: String,
    pub area: String,
    pub category: String,
    pub what_text: String,
    pub criteria_text: String,
}

/// Inspector identity as resolved by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmployeeDetails {
    pub employee_id: String,
    pub name: String,
    pub role: String,
    pub plant: String,
    pub department: String,
}

/// An observation already present remotely, used for resuming a tour and
/// for update-if-exists lookups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteObservation {
    pub remote_id: RemoteId,
    pub natural_key: NaturalKey,
    pub status: String,
}

/// Everything the UI needs while offline, fetched once when offline mode is
/// armed and replaced wholesale on each successful bootstrap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSnapshot {
    pub criteria: Vec<Criterion>,
    pub employee: EmployeeDetails,
    pub existing_observations: Vec<RemoteObservation>,
    pub fetched_at: DateTime<Utc>,
}

impl SessionSnapshot {
    pub fn is_stale(&self, now: DateTime<Utc>, ttl_hours: i64) -> bool {
        now - self.fetched_at > Duration::hours(ttl_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(fetched_at: DateTime<Utc>) -> SessionSnapshot {
        SessionSnapshot {
            criteria: vec![],
            employee: EmployeeDetails {
                employee_id: "e-1".into(),
                name: "Inspector".into(),
                role: "QA".into(),
                plant: "P01".into(),
                department: "Baking".into(),
            },
            existing_observations: vec![],
            fetched_at,
        }
    }

    #[test]
    fn fresh_snapshot_is_not_stale() {
        let now = Utc::now();
        assert!(!snapshot(now - Duration::hours(23)).is_stale(now, 24));
    }

    #[test]
    fn day_old_snapshot_is_stale() {
        let now = Utc::now();
        assert!(snapshot(now - Duration::hours(25)).is_stale(now, 24));
    }
}
