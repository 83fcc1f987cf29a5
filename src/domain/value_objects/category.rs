use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of an inspection record. The category selects the remote
/// gateway adapter and the natural-key rule that applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordCategory {
    ChecklistObservation,
    NotApplicableObservation,
    CreamPercentageCycle,
    SieveAndMagnetCycle,
    ProductMonitoringCycle,
}

impl RecordCategory {
    pub const ALL: [RecordCategory; 5] = [
        RecordCategory::ChecklistObservation,
        RecordCategory::NotApplicableObservation,
        RecordCategory::CreamPercentageCycle,
        RecordCategory::SieveAndMagnetCycle,
        RecordCategory::ProductMonitoringCycle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordCategory::ChecklistObservation => "checklist_observation",
            RecordCategory::NotApplicableObservation => "not_applicable_observation",
            RecordCategory::CreamPercentageCycle => "cream_percentage_cycle",
            RecordCategory::SieveAndMagnetCycle => "sieve_and_magnet_cycle",
            RecordCategory::ProductMonitoringCycle => "product_monitoring_cycle",
        }
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        match value {
            "checklist_observation" => Ok(RecordCategory::ChecklistObservation),
            "not_applicable_observation" => Ok(RecordCategory::NotApplicableObservation),
            "cream_percentage_cycle" => Ok(RecordCategory::CreamPercentageCycle),
            "sieve_and_magnet_cycle" => Ok(RecordCategory::SieveAndMagnetCycle),
            "product_monitoring_cycle" => Ok(RecordCategory::ProductMonitoringCycle),
            other => Err(format!("Unknown record category: {other}")),
        }
    }
}

impl fmt::Display for RecordCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_strings() {
        for category in RecordCategory::ALL {
            assert_eq!(RecordCategory::parse(category.as_str()), Ok(category));
        }
    }

    #[test]
    fn rejects_unknown_values() {
        assert!(RecordCategory::parse("espresso_cycle").is_err());
    }
}
