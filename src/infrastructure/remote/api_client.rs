use crate::application::ports::AuthProvider;
use crate::domain::value_objects::RemoteId;
use crate::shared::error::AppError;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Shared HTTP plumbing for every remote gateway: bearer auth, JSON bodies,
/// typed non-2xx errors carrying status and server body, and a single
/// token-refresh retry on 401/403. Transport timeouts are the client
/// default and surface as plain network errors.
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: Arc<dyn AuthProvider>,
}

impl ApiClient {
    pub fn new(base_url: String, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        }
    }

    pub async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<T, AppError> {
        let token = self.auth.access_token().await?;
        match self
            .dispatch(method.clone(), path, query, body, &token.token)
            .await
        {
            Err(AppError::RemoteRejection { status, .. }) if status == 401 || status == 403 => {
                let refreshed = self.auth.refresh().await?;
                self.dispatch(method, path, query, body, &refreshed.token)
                    .await
            }
            other => other,
        }
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
        token: &str,
    ) -> Result<T, AppError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut builder = self.client.request(method, url).bearer_auth(token);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        request_json(builder).await
    }
}

async fn request_json<T: DeserializeOwned>(
    builder: reqwest::RequestBuilder,
) -> Result<T, AppError> {
    let response = builder
        .send()
        .await
        .map_err(|err| AppError::Network(err.to_string()))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| AppError::Network(err.to_string()))?;
    if !status.is_success() {
        return Err(AppError::RemoteRejection {
            status: status.as_u16(),
            message: extract_error_message(&body, status),
        });
    }
    if body.is_empty() {
        // Endpoints that return no content decode into `null`.
        return serde_json::from_str("null")
            .map_err(|err| AppError::DeserializationError(err.to_string()));
    }
    serde_json::from_str(&body).map_err(|err| AppError::DeserializationError(err.to_string()))
}

/// Prefer the server-provided message where one exists.
fn extract_error_message(body: &str, status: StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for field in ["message", "error", "detail"] {
            if let Some(message) = value.get(field).and_then(Value::as_str) {
                return message.to_string();
            }
        }
    }
    if body.trim().is_empty() {
        status.to_string()
    } else {
        body.to_string()
    }
}

/// Decode the remote id from a response under an adapter's expected field.
/// Fails loudly when the field is absent instead of returning a silent
/// nothing.
pub fn extract_remote_id(value: &Value, field: &str) -> Result<RemoteId, AppError> {
    let raw = match value.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => {
            return Err(AppError::DeserializationError(format!(
                "Remote response is missing the `{field}` field: {value}"
            )));
        }
    };
    RemoteId::new(raw).map_err(AppError::DeserializationError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_string_and_numeric_ids() {
        let id = extract_remote_id(&json!({"observationId": "obs-1"}), "observationId").unwrap();
        assert_eq!(id.as_str(), "obs-1");

        let id = extract_remote_id(&json!({"cycleId": 42}), "cycleId").unwrap();
        assert_eq!(id.as_str(), "42");
    }

    #[test]
    fn missing_id_field_fails_loudly() {
        let err = extract_remote_id(&json!({"other": "x"}), "observationId").unwrap_err();
        assert!(matches!(err, AppError::DeserializationError(_)));
    }

    #[test]
    fn server_message_is_preferred() {
        let message =
            extract_error_message(r#"{"message":"cycle already closed"}"#, StatusCode::CONFLICT);
        assert_eq!(message, "cycle already closed");
    }

    #[test]
    fn plain_text_body_is_kept() {
        let message = extract_error_message("boom", StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "boom");
    }
}
