use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Client-generated id for a pending record: creation epoch millis plus a
/// random suffix, so ids stay unique across devices without a server round
/// trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingRecordId(String);

impl PendingRecordId {
    pub fn generate() -> Self {
        let millis = Utc::now().timestamp_millis();
        Self(format!("{millis}-{}", Uuid::new_v4().simple()))
    }

    pub fn new(value: String) -> Result<Self, String> {
        if value.trim().is_empty() {
            return Err("Pending record id cannot be empty".to_string());
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PendingRecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = PendingRecordId::generate();
        let b = PendingRecordId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn rejects_empty() {
        assert!(PendingRecordId::new("  ".into()).is_err());
    }
}
