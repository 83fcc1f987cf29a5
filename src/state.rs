use crate::application::ports::{
    AuthProvider, ConnectivityProbe, PendingStore, RecordGateway, ReferenceGateway, TourGateway,
};
use crate::application::services::{
    InspectionService, ModeController, SessionBootstrapper, Synchronizer,
};
use crate::infrastructure::remote::{
    ApiClient, CachedAuthProvider, HttpConnectivityProbe, HttpCycleGateway,
    HttpObservationGateway, HttpReferenceGateway, HttpTourGateway,
};
use crate::infrastructure::storage::SqlitePendingStore;
use crate::shared::AppConfig;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;

/// Application-wide state: every store, gateway and service instance is
/// constructed once here and injected explicitly.
#[derive(Clone)]
pub struct AppState {
    pub inspection_service: Arc<InspectionService>,
    pub mode_controller: Arc<ModeController>,
    pub store: Arc<dyn PendingStore>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&config.storage.data_dir)?;

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect(&config.database.url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;

        let store: Arc<dyn PendingStore> = Arc::new(SqlitePendingStore::new(
            pool,
            config.sync.stale_tour_days,
        ));

        let auth: Arc<dyn AuthProvider> = Arc::new(CachedAuthProvider::new(
            config.remote.token_url.clone(),
            config.remote.client_id.clone(),
        ));
        let api = Arc::new(ApiClient::new(config.remote.base_url.clone(), auth.clone()));

        let gateways: Vec<Arc<dyn RecordGateway>> = vec![
            Arc::new(HttpObservationGateway::checklist(api.clone())),
            Arc::new(HttpObservationGateway::not_applicable(api.clone())),
            Arc::new(HttpCycleGateway::cream_percentage(api.clone())),
            Arc::new(HttpCycleGateway::sieve_and_magnet(api.clone())),
            Arc::new(HttpCycleGateway::product_monitoring(api.clone())),
        ];
        let tours: Arc<dyn TourGateway> = Arc::new(HttpTourGateway::new(api.clone()));
        let reference: Arc<dyn ReferenceGateway> =
            Arc::new(HttpReferenceGateway::new(api.clone()));
        let connectivity: Arc<dyn ConnectivityProbe> =
            Arc::new(HttpConnectivityProbe::new(&config.remote.base_url));

        let mode_controller = Arc::new(ModeController::new());
        let synchronizer = Arc::new(Synchronizer::new(store.clone(), gateways.clone()));
        let bootstrapper = Arc::new(SessionBootstrapper::new(
            auth,
            tours.clone(),
            reference.clone(),
            store.clone(),
            connectivity,
            mode_controller.clone(),
        ));

        let inspection_service = Arc::new(InspectionService::new(
            store.clone(),
            mode_controller.clone(),
            synchronizer,
            bootstrapper,
            tours,
            reference,
            gateways,
            config.sync.snapshot_ttl_hours,
        ));

        Ok(Self {
            inspection_service,
            mode_controller,
            store,
        })
    }
}
