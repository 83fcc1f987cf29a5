use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub remote: RemoteConfig,
    pub sync: SyncConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    pub token_url: String,
    pub client_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Snapshot older than this is replaced wholesale on the next bootstrap.
    pub snapshot_ttl_hours: i64,
    /// Tours untouched for this long are evicted by the quota cleanup pass.
    pub stale_tour_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .map(|dir| dir.join("gemba"))
            .map(|dir| dir.to_string_lossy().into_owned())
            .unwrap_or_else(|| "./data".to_string());

        Self {
            database: DatabaseConfig {
                url: format!("sqlite://{data_dir}/gemba.db?mode=rwc"),
                max_connections: 5,
            },
            remote: RemoteConfig {
                base_url: "https://inspection.example.com/api".to_string(),
                token_url: "https://inspection.example.com/oauth/token".to_string(),
                client_id: "gemba-pwa".to_string(),
            },
            sync: SyncConfig {
                snapshot_ttl_hours: 24,
                stale_tour_days: 30,
            },
            storage: StorageConfig { data_dir },
        }
    }
}
