use serde::{Deserialize, Serialize};
use std::fmt;

/// Replay state of a queued record. `Synced` records are removed from the
/// durable store, never flagged in place, so only `Pending` and `Failed`
/// ever persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncState {
    Pending,
    Synced,
    Failed,
}

impl SyncState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncState::Pending => "pending",
            SyncState::Synced => "synced",
            SyncState::Failed => "failed",
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for SyncState {
    fn from(value: &str) -> Self {
        match value {
            "synced" => SyncState::Synced,
            "failed" => SyncState::Failed,
            _ => SyncState::Pending,
        }
    }
}
