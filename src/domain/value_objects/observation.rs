use serde::{Deserialize, Serialize};
use std::fmt;

/// User-facing response to a checklist criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseValue {
    Approved,
    Rejected,
    NotApplicable,
}

impl ResponseValue {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseValue::Approved => "Approved",
            ResponseValue::Rejected => "Rejected",
            ResponseValue::NotApplicable => "Not Applicable",
        }
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        match value {
            "Approved" => Ok(ResponseValue::Approved),
            "Rejected" => Ok(ResponseValue::Rejected),
            "Not Applicable" | "NA" => Ok(ResponseValue::NotApplicable),
            other => Err(format!("Unknown response value: {other}")),
        }
    }
}

impl fmt::Display for ResponseValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Domain status code written into the remote payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObservationStatus {
    Approved,
    /// Rejected and awaiting review.
    Pending,
    Rejected,
    NotApplicable,
}

impl ObservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObservationStatus::Approved => "Approved",
            ObservationStatus::Pending => "Pending",
            ObservationStatus::Rejected => "Rejected",
            ObservationStatus::NotApplicable => "NA",
        }
    }
}

impl fmt::Display for ObservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity attached to an observation. Approvals and NA always carry the
/// baseline; rejections split on the near-miss flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Baseline,
    NearMiss,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Baseline => "LOW",
            Severity::NearMiss => "NEAR_MISS",
            Severity::High => "HIGH",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
