pub mod inspection_service;
pub mod mode_controller;
pub mod record_builder;
pub mod session_bootstrapper;
pub mod synchronizer;

pub use inspection_service::{InspectionService, RecordOutcome};
pub use mode_controller::{ConnectionMode, ModeController};
pub use session_bootstrapper::{BootstrapOutcome, SessionBootstrapper};
pub use synchronizer::Synchronizer;
