pub mod pending_record;
pub mod snapshot;
pub mod sync_report;
pub mod tour;

pub use pending_record::{PendingRecord, PendingRecordDraft, TourBacklog};
pub use snapshot::{Criterion, EmployeeDetails, RemoteObservation, SessionSnapshot};
pub use sync_report::{SyncError, SyncRunSummary, TourSyncReport};
pub use tour::{Tour, TourStatus};
