pub mod auth_provider;
pub mod connectivity;
pub mod pending_store;
pub mod record_gateway;

pub use auth_provider::{AccessToken, AuthProvider};
pub use connectivity::ConnectivityProbe;
pub use pending_store::PendingStore;
pub use record_gateway::{RecordGateway, ReferenceGateway, TourGateway};
