use crate::application::ports::{AccessToken, AuthProvider};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Token provider backed by the external identity endpoint, with an
/// in-memory cache keyed on the expiry the server issued.
pub struct CachedAuthProvider {
    client: Client,
    token_url: String,
    client_id: String,
    cached: RwLock<Option<AccessToken>>,
}

impl CachedAuthProvider {
    pub fn new(token_url: String, client_id: String) -> Self {
        Self {
            client: Client::new(),
            token_url,
            client_id,
            cached: RwLock::new(None),
        }
    }

    async fn fetch_token(&self) -> Result<AccessToken, AppError> {
        let response = self
            .client
            .post(&self.token_url)
            .json(&json!({
                "client_id": self.client_id,
                "grant_type": "client_credentials",
            }))
            .send()
            .await
            .map_err(|err| AppError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Auth(format!(
                "Token endpoint returned {status}; please sign in again"
            )));
        }

        let payload: TokenResponse = response
            .json()
            .await
            .map_err(|err| AppError::DeserializationError(err.to_string()))?;

        let Some(token) = payload.access_token.filter(|t| !t.is_empty()) else {
            return Err(AppError::Auth(
                "Token endpoint returned no token; please sign in again".to_string(),
            ));
        };
        let expires_at = payload
            .expires_at
            .or_else(|| payload.expires_in.map(|secs| Utc::now().timestamp() + secs))
            .ok_or_else(|| {
                AppError::DeserializationError(
                    "Token response carries neither expires_at nor expires_in".to_string(),
                )
            })?;

        Ok(AccessToken { token, expires_at })
    }
}

#[async_trait]
impl AuthProvider for CachedAuthProvider {
    async fn access_token(&self) -> Result<AccessToken, AppError> {
        {
            let cached = self.cached.read().await;
            if let Some(token) = cached.as_ref() {
                if !token.is_expired() {
                    return Ok(token.clone());
                }
            }
        }
        self.refresh().await
    }

    async fn refresh(&self) -> Result<AccessToken, AppError> {
        let token = self.fetch_token().await?;
        tracing::debug!(target: "gemba::auth", expires_at = token.expires_at, "token refreshed");
        *self.cached.write().await = Some(token.clone());
        Ok(token)
    }
}
