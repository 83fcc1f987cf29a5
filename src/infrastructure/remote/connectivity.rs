use crate::application::ports::ConnectivityProbe;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Connectivity probe against the API's health endpoint. Short timeout: the
/// answer is a hint, not a guarantee the next write will succeed.
pub struct HttpConnectivityProbe {
    client: Client,
    health_url: String,
}

impl HttpConnectivityProbe {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(3))
                .build()
                .unwrap_or_default(),
            health_url: format!("{}/health", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl ConnectivityProbe for HttpConnectivityProbe {
    async fn is_online(&self) -> bool {
        match self.client.get(&self.health_url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
