use serde::{Deserialize, Serialize};
use std::fmt;

/// Business-meaningful identifier used to deduplicate records within a
/// category. Built from durable identifiers (criterion id, cycle number),
/// never from free-text display names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NaturalKey(String);

impl NaturalKey {
    pub fn new(value: String) -> Result<Self, String> {
        if value.trim().is_empty() {
            return Err("Natural key cannot be empty".to_string());
        }
        Ok(Self(value))
    }

    /// Key for a checklist observation: one row per criterion per tour.
    pub fn criterion(criterion_id: &str) -> Self {
        Self(format!("section:{criterion_id}"))
    }

    /// Key for a measurement cycle: one row per cycle number per tour.
    pub fn cycle(number: u32) -> Self {
        Self(format!("cycle:{number}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<NaturalKey> for String {
    fn from(value: NaturalKey) -> Self {
        value.0
    }
}
