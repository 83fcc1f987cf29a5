pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
pub mod state;

pub use application::services::{
    ConnectionMode, InspectionService, ModeController, RecordOutcome, SessionBootstrapper,
    Synchronizer,
};
pub use domain::entities::{
    PendingRecord, SessionSnapshot, SyncRunSummary, Tour, TourSyncReport,
};
pub use domain::value_objects::{NaturalKey, RecordCategory, RecordPayload, SyncState, TourId};
pub use shared::{AppConfig, AppError};
pub use state::AppState;

/// Initialize structured logging; `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gemba=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
