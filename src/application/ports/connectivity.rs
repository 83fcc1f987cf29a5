use async_trait::async_trait;

/// Browser/network connectivity signal. A hint only: gateway failures are
/// the authoritative trigger for degrading to offline.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn is_online(&self) -> bool;
}
