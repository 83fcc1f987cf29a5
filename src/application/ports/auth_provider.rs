use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Opaque bearer token with its expiry, as issued by the external token
/// provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: i64,
}

impl AccessToken {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now().timestamp()
    }
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// A valid cached token, or a fresh one if the cache is empty or
    /// expired. A `None`-shaped provider response surfaces as
    /// `AppError::Auth` — the operation must abort, never proceed
    /// unauthenticated.
    async fn access_token(&self) -> Result<AccessToken, AppError>;

    /// Force a refresh, used after a 401/403 from the remote API.
    async fn refresh(&self) -> Result<AccessToken, AppError>;
}
