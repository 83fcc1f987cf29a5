use crate::domain::value_objects::RecordCategory;
use crate::shared::error::AppError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionMode {
    Online,
    /// User started offline mode; snapshot fetch in flight.
    OfflineArmed,
    /// Mid-session against cached data only.
    OfflineActive,
}

impl ConnectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionMode::Online => "online",
            ConnectionMode::OfflineArmed => "offline_armed",
            ConnectionMode::OfflineActive => "offline_active",
        }
    }
}

impl fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tracks the explicit offline session state machine plus two independent
/// signals: the browser-style connectivity hint, and the set of categories
/// silently degraded to offline after a network failure.
pub struct ModeController {
    mode: RwLock<ConnectionMode>,
    degraded: RwLock<HashSet<RecordCategory>>,
    connectivity_hint: AtomicBool,
}

impl Default for ModeController {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeController {
    pub fn new() -> Self {
        Self {
            mode: RwLock::new(ConnectionMode::Online),
            degraded: RwLock::new(HashSet::new()),
            connectivity_hint: AtomicBool::new(true),
        }
    }

    pub async fn mode(&self) -> ConnectionMode {
        *self.mode.read().await
    }

    pub async fn is_offline_active(&self) -> bool {
        *self.mode.read().await == ConnectionMode::OfflineActive
    }

    /// Explicit user action; the only transition allowed to require live
    /// connectivity.
    pub async fn arm_offline(&self) -> Result<(), AppError> {
        let mut mode = self.mode.write().await;
        if *mode != ConnectionMode::Online {
            return Err(AppError::InvalidTransition(format!(
                "Cannot arm offline mode from {mode}"
            )));
        }
        *mode = ConnectionMode::OfflineArmed;
        tracing::info!(target: "gemba::mode", "online -> offline_armed");
        Ok(())
    }

    /// Automatic once the session bootstrap completes.
    pub async fn activate_offline(&self) -> Result<(), AppError> {
        let mut mode = self.mode.write().await;
        if *mode != ConnectionMode::OfflineArmed {
            return Err(AppError::InvalidTransition(format!(
                "Cannot activate offline mode from {mode}"
            )));
        }
        *mode = ConnectionMode::OfflineActive;
        tracing::info!(target: "gemba::mode", "offline_armed -> offline_active");
        Ok(())
    }

    /// Bootstrap failed after arming; nothing is partially armed.
    pub async fn abort_arming(&self) {
        let mut mode = self.mode.write().await;
        if *mode == ConnectionMode::OfflineArmed {
            *mode = ConnectionMode::Online;
            tracing::info!(target: "gemba::mode", "offline_armed -> online (bootstrap aborted)");
        }
    }

    /// Only valid once a sync run reported zero failures everywhere.
    pub async fn complete_offline(&self) -> Result<(), AppError> {
        let mut mode = self.mode.write().await;
        if *mode != ConnectionMode::OfflineActive {
            return Err(AppError::InvalidTransition(format!(
                "Cannot leave offline mode from {mode}"
            )));
        }
        *mode = ConnectionMode::Online;
        self.degraded.write().await.clear();
        tracing::info!(target: "gemba::mode", "offline_active -> online");
        Ok(())
    }

    /// Silent degrade-to-offline for one category after a network failure
    /// while nominally online.
    pub async fn degrade_category(&self, category: RecordCategory) {
        let mut degraded = self.degraded.write().await;
        if degraded.insert(category) {
            tracing::warn!(target: "gemba::mode", %category, "category degraded to offline");
        }
    }

    pub async fn restore_category(&self, category: RecordCategory) {
        let mut degraded = self.degraded.write().await;
        if degraded.remove(&category) {
            tracing::info!(target: "gemba::mode", %category, "category restored to online");
        }
    }

    pub async fn is_category_offline(&self, category: RecordCategory) -> bool {
        if self.is_offline_active().await {
            return true;
        }
        self.degraded.read().await.contains(&category)
    }

    pub async fn has_degraded_categories(&self) -> bool {
        !self.degraded.read().await.is_empty()
    }

    /// Browser connectivity events land here; a UI hint only.
    pub fn set_connectivity_hint(&self, online: bool) {
        self.connectivity_hint.store(online, Ordering::Relaxed);
    }

    pub fn connectivity_hint(&self) -> bool {
        self.connectivity_hint.load(Ordering::Relaxed)
    }
}
