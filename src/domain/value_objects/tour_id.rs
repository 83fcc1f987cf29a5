use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned tour identifier. Every pending record belongs to
/// exactly one tour.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TourId(String);

impl TourId {
    pub fn new(value: String) -> Result<Self, String> {
        Self::validate(&value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(value: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            return Err("Tour id cannot be empty".to_string());
        }
        Ok(())
    }
}

impl fmt::Display for TourId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<TourId> for String {
    fn from(value: TourId) -> Self {
        value.0
    }
}
